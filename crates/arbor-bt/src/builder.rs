//! Declarative tree construction.
//!
//! Instead of creating every node on a [`Root`](crate::Root) and wiring ids by
//! hand, describe the tree with these helpers and hand it to
//! [`Root::from_spec`](crate::Root::from_spec) or
//! [`Root::insert`](crate::Root::insert).
//!
//! ```rust,ignore
//! use arbor_bt::builder::*;
//!
//! let patrol = sequence(vec![
//!     condition(|bb| bb.contains(ALERT)),
//!     timeout(Duration::from_secs(5), leaf(WalkTo::next_waypoint())),
//! ]);
//! ```

use std::time::Duration;

use arbor_core::{ActionStatus, Blackboard, Result};

use crate::action::{from_fn, Action, Condition, LeafContext, Wait};
use crate::node::{CompositeKind, DecoratorKind};

/// Description of a subtree, not yet part of any root.
pub enum NodeSpec {
    Leaf(Box<dyn Action>),
    Composite {
        kind: CompositeKind,
        children: Vec<NodeSpec>,
    },
    Decorator {
        kind: DecoratorKind,
        child: Box<NodeSpec>,
    },
}

pub fn leaf(action: impl Action) -> NodeSpec {
    NodeSpec::Leaf(Box::new(action))
}

/// Leaf driven by a closure, ticked with the leaf's context.
pub fn leaf_fn<F>(tick: F) -> NodeSpec
where
    F: FnMut(&mut LeafContext<'_>) -> Result<ActionStatus> + 'static,
{
    leaf(from_fn(tick))
}

pub fn condition<F>(cond: F) -> NodeSpec
where
    F: FnMut(&Blackboard) -> bool + 'static,
{
    leaf(Condition::new(cond))
}

pub fn wait(duration: Duration) -> NodeSpec {
    leaf(Wait::new(duration))
}

fn composite(kind: CompositeKind, children: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec::Composite { kind, children }
}

pub fn sequence(children: Vec<NodeSpec>) -> NodeSpec {
    composite(CompositeKind::Sequence, children)
}

pub fn selector(children: Vec<NodeSpec>) -> NodeSpec {
    composite(CompositeKind::Selector, children)
}

pub fn random_sequence(children: Vec<NodeSpec>) -> NodeSpec {
    composite(CompositeKind::RandomSequence, children)
}

pub fn random_selector(children: Vec<NodeSpec>) -> NodeSpec {
    composite(CompositeKind::RandomSelector, children)
}

fn decorator(kind: DecoratorKind, child: NodeSpec) -> NodeSpec {
    NodeSpec::Decorator {
        kind,
        child: Box::new(child),
    }
}

pub fn inverter(child: NodeSpec) -> NodeSpec {
    decorator(DecoratorKind::Inverter, child)
}

pub fn succeeder(child: NodeSpec) -> NodeSpec {
    decorator(DecoratorKind::Succeeder, child)
}

pub fn until_fail(child: NodeSpec) -> NodeSpec {
    decorator(DecoratorKind::UntilFail, child)
}

/// Runs `child` to completion `times` times.
pub fn repeat(times: u32, child: NodeSpec) -> NodeSpec {
    decorator(DecoratorKind::repeater(times), child)
}

/// Fails if `child` is still running once `limit` has elapsed.
pub fn timeout(limit: Duration, child: NodeSpec) -> NodeSpec {
    decorator(DecoratorKind::timer(limit), child)
}
