#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle state of a single node instance.
///
/// A node starts `Inactive`, becomes `Running` when it is initialized and stays
/// there until its own tick settles it on `Success` or `Failure`. Deactivation
/// puts it back to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    #[default]
    Inactive,
    Running,
    Success,
    Failure,
}

impl Status {
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// `Success` or `Failure`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }

    /// Swaps `Success` and `Failure`; other states are returned unchanged.
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            other => other,
        }
    }
}

/// What a leaf action may report from a tick.
///
/// Leaves can never report `Inactive`, so they get their own narrower type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionStatus {
    Running,
    Success,
    Failure,
}

impl From<ActionStatus> for Status {
    fn from(value: ActionStatus) -> Self {
        match value {
            ActionStatus::Running => Status::Running,
            ActionStatus::Success => Status::Success,
            ActionStatus::Failure => Status::Failure,
        }
    }
}

impl From<bool> for ActionStatus {
    fn from(value: bool) -> Self {
        if value {
            ActionStatus::Success
        } else {
            ActionStatus::Failure
        }
    }
}
