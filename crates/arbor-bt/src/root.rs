//! The tree's entry point.
//!
//! A [`Root`] owns every node (in an arena addressed by [`NodeId`]), the
//! blackboard, the clock and the RNG. Nodes never hold a pointer back to it:
//! every node operation runs as a method on the root, which is the context the
//! node reads and writes through.
//!
//! Each [`Root::tick`]:
//! 1. polls the deferred checks in node-id order and ticks every node whose
//!    check fired, if that node is still running;
//! 2. unregisters the fired checks in one batch;
//! 3. ticks the cached active node directly when it is still running, or
//!    re-enters traversal from the root child otherwise. Once the root child is
//!    no longer running its status becomes the root's.

use std::rc::Rc;
use std::time::Duration;

use arbor_core::{
    BbKey, Blackboard, BtError, Check, Clock, DeterministicRng, MonotonicClock, NodeId, Result,
    RootConfig, SplitMix64, Status, TickContext,
};
use tracing::{debug, trace, warn};

use crate::action::{Action, LeafContext};
use crate::builder::NodeSpec;
use crate::node::{CompositeKind, DecoratorKind, Node, NodeKind};
use crate::trace::{TraceEvent, TraceLog, TraceSink};

pub struct Root {
    pub(crate) nodes: Vec<Node>,
    pub(crate) child: Option<NodeId>,
    pub(crate) active: Option<NodeId>,
    pub(crate) status: Status,
    pub(crate) blackboard: Blackboard,
    pub(crate) clock: Rc<dyn Clock>,
    pub(crate) rng: Box<dyn DeterministicRng>,
    pub(crate) tick_ctx: TickContext,
    trace_log: Option<TraceLog>,
    trace_sink: Option<Box<dyn TraceSink>>,
}

impl Root {
    pub fn new() -> Self {
        Self::with_config(RootConfig::default())
    }

    pub fn with_config(config: RootConfig) -> Self {
        Self {
            nodes: Vec::new(),
            child: None,
            active: None,
            status: Status::Inactive,
            blackboard: Blackboard::new(),
            clock: Rc::new(MonotonicClock::new()),
            rng: Box::new(SplitMix64::new(config.seed)),
            tick_ctx: TickContext {
                tick: 0,
                now: Duration::ZERO,
            },
            trace_log: config.trace.then(TraceLog::default),
            trace_sink: None,
        }
    }

    /// Builds the nodes described by `spec` and makes them the root child.
    pub fn from_spec(spec: NodeSpec, config: RootConfig) -> Result<Self> {
        let mut root = Self::with_config(config);
        let child = root.insert(spec)?;
        root.set_child(child)?;
        Ok(root)
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    pub fn with_rng<R: DeterministicRng + 'static>(mut self, rng: R) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace_sink = Some(sink);
    }

    /// In-memory trace, present when the root was configured with `trace`.
    pub fn trace_log(&self) -> Option<&TraceLog> {
        self.trace_log.as_ref()
    }

    // ------------------------------------------------------------------
    // Assembly
    // ------------------------------------------------------------------

    fn add_node(&mut self, kind: NodeKind) -> Result<NodeId> {
        let id = NodeId::from_index(self.nodes.len())?;
        self.nodes.push(Node::new(kind));
        Ok(id)
    }

    pub fn add_leaf(&mut self, action: impl Action) -> Result<NodeId> {
        self.add_node(NodeKind::Leaf(Box::new(action)))
    }

    pub fn add_composite(&mut self, kind: CompositeKind) -> Result<NodeId> {
        self.add_node(NodeKind::Composite {
            kind,
            children: Vec::new(),
        })
    }

    pub fn add_decorator(&mut self, kind: DecoratorKind) -> Result<NodeId> {
        self.add_node(NodeKind::Decorator { kind, child: None })
    }

    /// Creates the nodes described by `spec`, wired together, and returns the
    /// id of its top node. The result is detached; attach it with
    /// [`add_child`](Self::add_child) or [`set_child`](Self::set_child).
    pub fn insert(&mut self, spec: NodeSpec) -> Result<NodeId> {
        match spec {
            NodeSpec::Leaf(action) => self.add_node(NodeKind::Leaf(action)),
            NodeSpec::Composite { kind, children } => {
                let id = self.add_composite(kind)?;
                for child in children {
                    let child = self.insert(child)?;
                    self.add_child(id, child)?;
                }
                Ok(id)
            }
            NodeSpec::Decorator { kind, child } => {
                let id = self.add_decorator(kind)?;
                let child = self.insert(*child)?;
                self.add_child(id, child)?;
                Ok(id)
            }
        }
    }

    /// Appends `child` to a composite, or sets it as a decorator's child
    /// (detaching any previous one).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node_index(parent)?;
        let index = self.node_index(child)?;
        if self.nodes[index].parent.is_some() || self.child == Some(child) {
            return Err(BtError::AlreadyAttached { node: child });
        }

        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(BtError::WouldCycle { node: child });
            }
            cursor = self.nodes[ancestor.index()].parent;
        }

        let replaced = match &mut self.nodes[parent.index()].kind {
            NodeKind::Leaf(_) => return Err(BtError::InvalidParent { node: parent }),
            NodeKind::Composite { children, .. } => {
                children.push(child);
                None
            }
            NodeKind::Decorator { child: slot, .. } => slot.replace(child),
        };
        if let Some(old) = replaced {
            self.nodes[old.index()].parent = None;
        }
        self.nodes[index].parent = Some(parent);
        Ok(())
    }

    /// Sets the root's single child.
    pub fn set_child(&mut self, child: NodeId) -> Result<()> {
        let index = self.node_index(child)?;
        if self.nodes[index].parent.is_some() {
            return Err(BtError::AlreadyAttached { node: child });
        }
        self.child = Some(child);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Marks the tree running and initializes the root child, which in turn
    /// initializes down to the first leaf and claims it as the active node.
    pub fn initialize(&mut self) -> Result<()> {
        let child = self.child.ok_or(BtError::MissingChild)?;
        self.status = Status::Running;
        self.tick_ctx.now = self.clock.now();
        debug!(child = %child, nodes = self.nodes.len(), "initializing tree");
        self.emit(TraceEvent::new(self.tick_ctx.tick, "bt.init").with_node(child));
        self.initialize_node(child)
    }

    pub fn tick(&mut self) -> Result<Status> {
        let child = self.child.ok_or(BtError::MissingChild)?;
        self.tick_ctx = TickContext {
            tick: self.tick_ctx.tick + 1,
            now: self.clock.now(),
        };
        let tick = self.tick_ctx.tick;
        trace!(tick, "root tick");

        // fired checks are unregistered even when a node errors mid-pass
        let checked = self.run_checks(tick);
        self.blackboard.remove_scheduled_checks();
        checked?;

        match self.nodes[child.index()].status {
            Status::Running => match self.active.filter(|a| self.is_running(*a)) {
                Some(active) => {
                    self.emit(TraceEvent::new(tick, "bt.tick.fast").with_node(active));
                    self.tick_node(active)?;
                }
                None => {
                    self.emit(TraceEvent::new(tick, "bt.tick.traverse").with_node(child));
                    self.tick_node(child)?;
                }
            },
            status => {
                if status != self.status && status.is_terminal() {
                    debug!(?status, tick, "tree finished");
                }
                self.status = status;
            }
        }
        Ok(self.status)
    }

    /// Polls every deferred check in node-id order. Fired checks are only
    /// queued for removal; the caller applies the queue.
    fn run_checks(&mut self, tick: u64) -> Result<()> {
        for id in self.blackboard.check_ids() {
            if !self.blackboard.poll_check(id) {
                continue;
            }
            self.blackboard.schedule_check_removal(id);
            self.emit(TraceEvent::new(tick, "bt.check.fired").with_node(id));
            match self.nodes.get(id.index()).map(Node::status) {
                Some(Status::Running) => {
                    debug!(node = %id, "deferred check fired");
                    self.tick_node(id)?;
                }
                status => warn!(node = %id, ?status, "deferred check fired for an idle node"),
            }
        }
        Ok(())
    }

    /// Ticks until the root reaches `Success` or `Failure`, at most
    /// `max_ticks` times. Returns the root status after the last tick.
    pub fn run_until_terminal(&mut self, max_ticks: u64) -> Result<Status> {
        for _ in 0..max_ticks {
            let status = self.tick()?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
        Ok(self.status)
    }

    /// Deactivates the whole tree and drops every deferred check. Blackboard
    /// values are kept; call [`initialize`](Self::initialize) to run again.
    pub fn reset(&mut self) {
        if let Some(child) = self.child {
            self.deactivate_node(child);
        }
        self.blackboard.clear_checks();
        self.active = None;
        self.status = Status::Inactive;
    }

    /// Makes `node` the target of the fast path on the next tick.
    pub fn set_active(&mut self, node: NodeId) {
        self.active = Some(node);
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Number of root ticks so far.
    pub fn ticks(&self) -> u64 {
        self.tick_ctx.tick
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn status_of(&self, id: NodeId) -> Result<Status> {
        Ok(self.nodes[self.node_index(id)?].status)
    }

    pub fn tick_count(&self, id: NodeId) -> Result<u64> {
        Ok(self.nodes[self.node_index(id)?].ticks)
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(self.nodes[self.node_index(id)?].kind())
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.nodes[self.node_index(id)?].children())
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    // ------------------------------------------------------------------
    // Blackboard
    // ------------------------------------------------------------------

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn set_value<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.blackboard.set_value(key, value);
    }

    pub fn get_value<T: 'static>(&self, key: BbKey<T>) -> Result<&T> {
        self.blackboard.get_value(key)
    }

    pub fn push_stack<T: 'static>(&mut self, key: BbKey<Vec<T>>, value: T) -> Result<()> {
        self.blackboard.push_stack(key, value)
    }

    pub fn pop_stack<T: 'static>(&mut self, key: BbKey<Vec<T>>) -> Result<Option<T>> {
        self.blackboard.pop_stack(key)
    }

    pub fn flush_stack<T: 'static>(&mut self, key: BbKey<Vec<T>>) -> Result<bool> {
        self.blackboard.flush_stack(key)
    }

    pub fn add_check(&mut self, node: NodeId, check: Check) -> Result<()> {
        self.node_index(node)?;
        self.blackboard.add_check(node, check);
        Ok(())
    }

    pub fn del_check(&mut self, node: NodeId) {
        self.blackboard.del_check(node);
    }

    // ------------------------------------------------------------------
    // Node dispatch
    // ------------------------------------------------------------------

    fn node_index(&self, id: NodeId) -> Result<usize> {
        if id.index() < self.nodes.len() {
            Ok(id.index())
        } else {
            Err(BtError::UnknownNode { node: id })
        }
    }

    fn is_running(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|n| n.status.is_running())
    }

    pub(crate) fn initialize_node(&mut self, id: NodeId) -> Result<()> {
        match self.nodes[id.index()].kind {
            NodeKind::Leaf(_) => self.initialize_leaf(id),
            NodeKind::Composite { kind, .. } => self.initialize_composite(id, kind),
            NodeKind::Decorator { kind, child } => self.initialize_decorator(id, kind, child),
        }
    }

    pub(crate) fn tick_node(&mut self, id: NodeId) -> Result<()> {
        let index = id.index();
        let before = self.nodes[index].status;
        self.nodes[index].ticks += 1;

        match self.nodes[index].kind {
            NodeKind::Leaf(_) => self.tick_leaf(id)?,
            NodeKind::Composite { kind, .. } => self.tick_composite(id, kind)?,
            NodeKind::Decorator { kind, child } => self.tick_decorator(id, kind, child)?,
        }

        let after = self.nodes[index].status;
        if after != before && after.is_terminal() {
            debug!(node = %id, status = ?after, "node finished");
            self.emit(
                TraceEvent::new(self.tick_ctx.tick, "bt.node.done")
                    .with_node(id)
                    .with_status(after),
            );
        }
        Ok(())
    }

    /// Claims `id` as active, (re)initializes it and gives it its first tick.
    pub(crate) fn start_node(&mut self, id: NodeId) -> Result<()> {
        self.set_active(id);
        self.initialize_node(id)?;
        self.tick_node(id)
    }

    /// Back to `Inactive`. Composites and decorators take their non-idle
    /// children with them, timers drop their check, and running leaves get
    /// a chance to cancel.
    pub(crate) fn deactivate_node(&mut self, id: NodeId) {
        let index = id.index();
        match self.nodes[index].kind {
            NodeKind::Leaf(_) => {
                if self.nodes[index].status.is_running() {
                    self.cancel_leaf(id);
                }
            }
            NodeKind::Composite { .. } => {
                let mut i = 0;
                while let Some(child) = self.child_at(id, i) {
                    if self.nodes[child.index()].status != Status::Inactive {
                        self.deactivate_node(child);
                    }
                    i += 1;
                }
            }
            NodeKind::Decorator { kind, child } => {
                if matches!(kind, DecoratorKind::ManualTimer { .. }) {
                    self.blackboard.del_check(id);
                }
                if let Some(child) = child {
                    if self.nodes[child.index()].status != Status::Inactive {
                        self.deactivate_node(child);
                    }
                }
            }
        }
        self.nodes[index].status = Status::Inactive;
    }

    pub(crate) fn child_at(&self, id: NodeId, i: usize) -> Option<NodeId> {
        self.nodes[id.index()].children().get(i).copied()
    }

    fn initialize_leaf(&mut self, id: NodeId) -> Result<()> {
        self.nodes[id.index()].status = Status::Running;
        self.set_active(id);

        let Root {
            nodes,
            blackboard,
            tick_ctx,
            ..
        } = self;
        if let NodeKind::Leaf(action) = &mut nodes[id.index()].kind {
            let mut ctx = LeafContext::new(id, *tick_ctx, blackboard);
            action.initialize(&mut ctx)?;
        }
        Ok(())
    }

    fn tick_leaf(&mut self, id: NodeId) -> Result<()> {
        let Root {
            nodes,
            blackboard,
            tick_ctx,
            ..
        } = self;
        let node = &mut nodes[id.index()];
        if let NodeKind::Leaf(action) = &mut node.kind {
            let mut ctx = LeafContext::new(id, *tick_ctx, blackboard);
            let status = action.tick(&mut ctx)?;
            node.status = status.into();
        }
        Ok(())
    }

    fn cancel_leaf(&mut self, id: NodeId) {
        let Root {
            nodes,
            blackboard,
            tick_ctx,
            ..
        } = self;
        if let NodeKind::Leaf(action) = &mut nodes[id.index()].kind {
            let mut ctx = LeafContext::new(id, *tick_ctx, blackboard);
            action.cancel(&mut ctx);
        }
    }

    pub(crate) fn emit(&mut self, event: TraceEvent) {
        if let Some(log) = self.trace_log.as_mut() {
            log.push(event.clone());
        }
        if let Some(sink) = self.trace_sink.as_mut() {
            sink.emit(event);
        }
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}
