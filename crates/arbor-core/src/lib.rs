//! Engine-agnostic primitives for the `arbor` behavior tree runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod clock;
pub mod config;
pub mod error;
pub mod node;
pub mod rng;
pub mod status;
pub mod tick;

pub use blackboard::{BbKey, Blackboard, Check};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::RootConfig;
pub use error::{BtError, Result};
pub use node::NodeId;
pub use rng::{shuffle, DeterministicRng, SplitMix64};
pub use status::{ActionStatus, Status};
pub use tick::TickContext;
