use thiserror::Error;

use crate::NodeId;

/// Errors raised while assembling, initializing or ticking a tree.
///
/// Configuration errors are fatal to the tree: the caller has to fix the way
/// the tree was built. None of these are retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BtError {
    #[error("composite node {node} has no children")]
    ChildlessComposite { node: NodeId },

    #[error("decorator node {node} has no child")]
    ChildlessDecorator { node: NodeId },

    #[error("root has no child")]
    MissingChild,

    #[error("node {node} is a leaf and cannot take children")]
    InvalidParent { node: NodeId },

    #[error("node {node} does not belong to this tree")]
    UnknownNode { node: NodeId },

    #[error("node {node} already has a parent")]
    AlreadyAttached { node: NodeId },

    #[error("tree already holds {len} nodes, no more ids are available")]
    TooManyNodes { len: usize },

    #[error("attaching node {node} would create a cycle")]
    WouldCycle { node: NodeId },

    #[error("blackboard key `{key}` already holds a value that is not a stack")]
    KeyConflict { key: &'static str },

    #[error("blackboard key `{key}` is not set")]
    MissingKey { key: &'static str },

    #[error("blackboard key `{key}` holds a value of a different type")]
    TypeMismatch { key: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BtError>;
