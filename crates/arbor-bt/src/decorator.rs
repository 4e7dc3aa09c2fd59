//! Single-child status transformers.
//!
//! | decorator | child `Running` | child `Success` | child `Failure` |
//! |---|---|---|---|
//! | Inverter | tick child | fail | succeed |
//! | Succeeder | tick child | succeed | succeed |
//! | UntilFail | tick child | restart child | succeed |
//! | ManualRepeater | tick child | restart child until the count runs out, then succeed | same |
//! | ManualTimer | fail on timeout, else tick child | mirror | mirror |
//!
//! Settling always deactivates the child. A child found `Inactive` is simply
//! started again.

use std::rc::Rc;

use arbor_core::{BtError, NodeId, Result, Status};
use tracing::debug;

use crate::node::{DecoratorKind, NodeKind};
use crate::root::Root;

impl Root {
    pub(crate) fn initialize_decorator(
        &mut self,
        id: NodeId,
        kind: DecoratorKind,
        child: Option<NodeId>,
    ) -> Result<()> {
        let child = child.ok_or(BtError::ChildlessDecorator { node: id })?;
        self.nodes[id.index()].status = Status::Running;

        let mut kind = match kind {
            DecoratorKind::ManualRepeater { times, .. } => DecoratorKind::ManualRepeater {
                times,
                remaining: times,
            },
            other => other,
        };

        self.set_active(child);
        self.initialize_node(child)?;

        if let DecoratorKind::ManualTimer { limit, .. } = kind {
            let started = self.tick_ctx.now;
            kind = DecoratorKind::ManualTimer { limit, started };

            // fires even while some unrelated leaf holds the fast path
            let clock = Rc::clone(&self.clock);
            let deadline = started.saturating_add(limit);
            self.blackboard
                .add_check(id, Box::new(move || clock.now() >= deadline));
        }

        self.store_decorator_kind(id, kind);
        debug!(node = %id, ?kind, "decorator initialized");
        Ok(())
    }

    pub(crate) fn tick_decorator(
        &mut self,
        id: NodeId,
        kind: DecoratorKind,
        child: Option<NodeId>,
    ) -> Result<()> {
        let child = child.ok_or(BtError::ChildlessDecorator { node: id })?;

        if let DecoratorKind::ManualTimer { limit, started } = kind {
            if self.tick_ctx.now.saturating_sub(started) >= limit {
                debug!(node = %id, ?limit, "timer expired");
                self.settle_decorator(id, kind, child, Status::Failure);
                return Ok(());
            }
        }

        let outcome = self.nodes[child.index()].status;
        match outcome {
            Status::Running => return self.tick_node(child),
            Status::Inactive => return self.start_node(child),
            Status::Success | Status::Failure => {}
        }

        match kind {
            DecoratorKind::Inverter => self.settle_decorator(id, kind, child, outcome.invert()),
            DecoratorKind::Succeeder => self.settle_decorator(id, kind, child, Status::Success),
            DecoratorKind::UntilFail => {
                if outcome == Status::Success {
                    return self.start_node(child);
                }
                self.settle_decorator(id, kind, child, Status::Success);
            }
            DecoratorKind::ManualRepeater { times, remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.store_decorator_kind(id, DecoratorKind::ManualRepeater { times, remaining });
                if remaining > 0 {
                    return self.start_node(child);
                }
                self.settle_decorator(id, kind, child, Status::Success);
            }
            DecoratorKind::ManualTimer { .. } => self.settle_decorator(id, kind, child, outcome),
        }
        Ok(())
    }

    fn settle_decorator(&mut self, id: NodeId, kind: DecoratorKind, child: NodeId, status: Status) {
        self.deactivate_node(child);
        if matches!(kind, DecoratorKind::ManualTimer { .. }) {
            self.blackboard.del_check(id);
        }
        self.nodes[id.index()].status = status;
    }

    fn store_decorator_kind(&mut self, id: NodeId, kind: DecoratorKind) {
        if let NodeKind::Decorator { kind: slot, .. } = &mut self.nodes[id.index()].kind {
            *slot = kind;
        }
    }
}
