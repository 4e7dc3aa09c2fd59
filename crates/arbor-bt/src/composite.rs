//! Composite traversal.
//!
//! Sequence and selector share one scan with opposite polarity: children are
//! visited in their current order and the scan stops at the first child that
//! still needs work, or at the first outcome that settles the composite.
//!
//! | child state | Sequence | Selector |
//! |---|---|---|
//! | `Inactive` | start it, stop | start it, stop |
//! | `Running` | tick it, stop | tick it, stop |
//! | `Failure` | fail | next child (fail if last) |
//! | `Success` | next child (succeed if last) | succeed |
//!
//! The random variants shuffle their children once per initialize, so the
//! order is fixed for a whole run.

use arbor_core::{shuffle, BtError, NodeId, Result, Status};
use tracing::debug;

use crate::node::{CompositeKind, NodeKind};
use crate::root::Root;

impl Root {
    pub(crate) fn initialize_composite(&mut self, id: NodeId, kind: CompositeKind) -> Result<()> {
        let first = match &mut self.nodes[id.index()].kind {
            NodeKind::Composite { children, .. } => {
                if kind.shuffles() {
                    shuffle(self.rng.as_mut(), children);
                }
                children.first().copied()
            }
            _ => None,
        };
        let first = first.ok_or(BtError::ChildlessComposite { node: id })?;

        self.nodes[id.index()].status = Status::Running;
        debug!(node = %id, ?kind, first = %first, "composite initialized");
        self.set_active(first);
        self.initialize_node(first)
    }

    pub(crate) fn tick_composite(&mut self, id: NodeId, kind: CompositeKind) -> Result<()> {
        let mut i = 0;
        while let Some(child) = self.child_at(id, i) {
            let status = self.nodes[child.index()].status;
            match status {
                Status::Inactive => return self.start_node(child),
                Status::Running => return self.tick_node(child),
                Status::Success | Status::Failure => {
                    let last = self.child_at(id, i + 1).is_none();
                    if status == kind.short_circuit() || last {
                        self.finish_composite(id, status);
                        return Ok(());
                    }
                }
            }
            i += 1;
        }
        Ok(())
    }

    /// Settles the composite and deactivates every child.
    fn finish_composite(&mut self, id: NodeId, status: Status) {
        self.nodes[id.index()].status = status;
        let mut i = 0;
        while let Some(child) = self.child_at(id, i) {
            self.deactivate_node(child);
            i += 1;
        }
    }
}
