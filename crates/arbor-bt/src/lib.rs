//! Resumable behavior tree runtime built on `arbor-core`.
//!
//! A tree is assembled once under a [`Root`], initialized, then ticked once per
//! control cycle. Work in progress is resumed rather than re-evaluated: the
//! root remembers the node that is currently doing work (the *active* node)
//! and ticks it directly until it settles.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod builder;
mod composite;
mod decorator;
pub mod node;
pub mod root;
pub mod trace;

pub use action::{from_fn, Action, Condition, FnAction, LeafContext, Wait};
pub use builder::NodeSpec;
pub use node::{CompositeKind, DecoratorKind, Node, NodeKind};
pub use root::Root;
pub use trace::{TraceEvent, TraceLog, TraceSink};

pub use arbor_core::{
    ActionStatus, BbKey, Blackboard, BtError, Clock, ManualClock, MonotonicClock, NodeId, Result,
    RootConfig, Status,
};
