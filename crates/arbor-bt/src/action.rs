//! Leaf actions: the open extension point of a tree.
//!
//! Everything domain-specific (moving, attacking, checking sensors) lives in an
//! [`Action`]. The tree only needs an action to report how its current run is
//! going each time it is ticked.

use std::time::Duration;

use arbor_core::{ActionStatus, Blackboard, Check, NodeId, Result, TickContext};

/// What a leaf sees while it is initialized or ticked.
pub struct LeafContext<'a> {
    node: NodeId,
    tick: TickContext,
    blackboard: &'a mut Blackboard,
}

impl<'a> LeafContext<'a> {
    pub(crate) fn new(node: NodeId, tick: TickContext, blackboard: &'a mut Blackboard) -> Self {
        Self {
            node,
            tick,
            blackboard,
        }
    }

    /// Id of the leaf being run.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tick(&self) -> TickContext {
        self.tick
    }

    /// Clock reading taken when the current root tick (or `initialize`)
    /// started. Every leaf run in the same tick sees the same value.
    pub fn now(&self) -> Duration {
        self.tick.now
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    /// Registers a deferred check for this leaf. When it returns true the root
    /// ticks this leaf before normal traversal, once.
    pub fn add_check(&mut self, check: Check) {
        self.blackboard.add_check(self.node, check);
    }

    pub fn del_check(&mut self) {
        self.blackboard.del_check(self.node);
    }
}

pub trait Action: 'static {
    /// Called every time the leaf starts a new run.
    fn initialize(&mut self, _ctx: &mut LeafContext<'_>) -> Result<()> {
        Ok(())
    }

    fn tick(&mut self, ctx: &mut LeafContext<'_>) -> Result<ActionStatus>;

    /// Called when the leaf is deactivated while still running, e.g. because
    /// an enclosing timer ran out.
    fn cancel(&mut self, _ctx: &mut LeafContext<'_>) {}
}

/// Adapts a closure into an [`Action`] with no per-run setup.
pub struct FnAction<F> {
    tick: F,
}

pub fn from_fn<F>(tick: F) -> FnAction<F>
where
    F: FnMut(&mut LeafContext<'_>) -> Result<ActionStatus> + 'static,
{
    FnAction { tick }
}

impl<F> Action for FnAction<F>
where
    F: FnMut(&mut LeafContext<'_>) -> Result<ActionStatus> + 'static,
{
    fn tick(&mut self, ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
        (self.tick)(ctx)
    }
}

/// One-tick leaf: `Success` when the predicate holds, `Failure` otherwise.
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(cond: F) -> Self {
        Self { cond }
    }
}

impl<F> Action for Condition<F>
where
    F: FnMut(&Blackboard) -> bool + 'static,
{
    fn tick(&mut self, ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
        Ok((self.cond)(ctx.blackboard()).into())
    }
}

/// Keeps running until `duration` has passed since the run started, then
/// succeeds.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    duration: Duration,
    started: Duration,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: Duration::ZERO,
        }
    }
}

impl Action for Wait {
    fn initialize(&mut self, ctx: &mut LeafContext<'_>) -> Result<()> {
        self.started = ctx.now();
        Ok(())
    }

    fn tick(&mut self, ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
        if ctx.now().saturating_sub(self.started) >= self.duration {
            Ok(ActionStatus::Success)
        } else {
            Ok(ActionStatus::Running)
        }
    }
}
