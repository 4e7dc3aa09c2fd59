//! Runtime settings for a tree root.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings applied when a root is created.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RootConfig {
    /// Seed for the RNG behind the random composites.
    pub seed: u64,

    /// Record trace events into an in-memory log.
    pub trace: bool,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_A7B0,
            trace: false,
        }
    }
}

#[cfg(feature = "serde")]
impl RootConfig {
    pub fn from_yaml_str(source: &str) -> crate::Result<Self> {
        serde_yaml::from_str(source).map_err(|e| crate::BtError::Config(e.to_string()))
    }

    /// Loads a YAML config file.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| crate::BtError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&source)
    }
}
