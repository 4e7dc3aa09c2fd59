use core::fmt;
use std::time::Duration;

use arbor_core::{NodeId, Status};

use crate::action::Action;

/// Multi-child traversal strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Sequence,
    Selector,
    RandomSequence,
    RandomSelector,
}

impl CompositeKind {
    /// The child outcome that ends the composite early with that same outcome.
    /// Any other terminal outcome moves on to the next child, unless it came
    /// from the last one.
    pub fn short_circuit(self) -> Status {
        match self {
            CompositeKind::Sequence | CompositeKind::RandomSequence => Status::Failure,
            CompositeKind::Selector | CompositeKind::RandomSelector => Status::Success,
        }
    }

    /// Whether child order is reshuffled on every initialize.
    pub fn shuffles(self) -> bool {
        matches!(
            self,
            CompositeKind::RandomSequence | CompositeKind::RandomSelector
        )
    }
}

/// Single-child status transformers, with their per-run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    Inverter,
    Succeeder,
    UntilFail,
    /// Runs the child to completion `times` times, whatever the outcomes.
    ManualRepeater { times: u32, remaining: u32 },
    /// Fails once `limit` has elapsed since initialize, otherwise mirrors the
    /// child.
    ManualTimer { limit: Duration, started: Duration },
}

impl DecoratorKind {
    pub fn repeater(times: u32) -> Self {
        DecoratorKind::ManualRepeater {
            times,
            remaining: times,
        }
    }

    pub fn timer(limit: Duration) -> Self {
        DecoratorKind::ManualTimer {
            limit,
            started: Duration::ZERO,
        }
    }
}

pub enum NodeKind {
    Leaf(Box<dyn Action>),
    Composite {
        kind: CompositeKind,
        children: Vec<NodeId>,
    },
    Decorator {
        kind: DecoratorKind,
        child: Option<NodeId>,
    },
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf(_) => f.write_str("Leaf"),
            NodeKind::Composite { kind, children } => f
                .debug_struct("Composite")
                .field("kind", kind)
                .field("children", children)
                .finish(),
            NodeKind::Decorator { kind, child } => f
                .debug_struct("Decorator")
                .field("kind", kind)
                .field("child", child)
                .finish(),
        }
    }
}

/// One arena slot.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) status: Status,
    pub(crate) parent: Option<NodeId>,
    pub(crate) ticks: u64,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            status: Status::Inactive,
            parent: None,
            ticks: 0,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// How many times this node's own tick logic has run.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Children in current traversal order.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Composite { children, .. } => children,
            NodeKind::Decorator { child, .. } => child.as_slice(),
        }
    }
}
