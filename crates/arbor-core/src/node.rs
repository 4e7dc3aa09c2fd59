use core::fmt;

use crate::{BtError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable handle to a node inside a tree's arena.
///
/// Ids are handed out in insertion order, which also fixes the order in which
/// deferred checks are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id for the arena slot at `index`; fails once ids no longer fit a `u32`.
    pub fn from_index(index: usize) -> Result<Self> {
        u32::try_from(index)
            .map(NodeId)
            .map_err(|_| BtError::TooManyNodes { len: index })
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
