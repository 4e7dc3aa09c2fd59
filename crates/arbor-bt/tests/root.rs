mod common;

use std::cell::Cell;
use std::time::Duration;

use arbor_bt::builder::{condition, leaf, leaf_fn, sequence};
use arbor_bt::{
    Action, ActionStatus, BbKey, BtError, Clock, CompositeKind, LeafContext, NodeId, NodeKind,
    Result, Root, RootConfig, Status,
};
use common::{Scripted, R, S};

const ALERT: BbKey<bool> = BbKey::new("alert");

#[test]
fn running_leaf_is_resumed_without_retraversal() {
    let mut root = Root::new();
    let seq = root.add_composite(CompositeKind::Sequence).unwrap();
    let (a, _) = Scripted::always(S);
    let (b, tally_b) = Scripted::new(&[R, R, R, S]);
    let a = root.add_leaf(a).unwrap();
    let b = root.add_leaf(b).unwrap();
    root.add_child(seq, a).unwrap();
    root.add_child(seq, b).unwrap();
    root.set_child(seq).unwrap();
    root.initialize().unwrap();

    root.tick().unwrap();
    assert_eq!(root.tick_count(seq).unwrap(), 0);

    // one traversal hands the tree over to b
    root.tick().unwrap();
    assert_eq!(root.tick_count(seq).unwrap(), 1);
    assert_eq!(root.active(), Some(b));

    for _ in 0..3 {
        root.tick().unwrap();
    }
    assert_eq!(tally_b.ticks(), 4);
    assert_eq!(root.tick_count(seq).unwrap(), 1);

    root.tick().unwrap();
    assert_eq!(root.tick_count(seq).unwrap(), 2);
    assert_eq!(root.status_of(seq).unwrap(), Status::Success);
}

#[test]
fn root_without_child_is_rejected() {
    let mut root = Root::new();

    assert_eq!(root.initialize(), Err(BtError::MissingChild));
    assert_eq!(root.tick(), Err(BtError::MissingChild));
}

#[test]
fn ticking_before_initialize_does_nothing() {
    let mut root = Root::new();
    let (a, tally) = Scripted::always(S);
    let a = root.add_leaf(a).unwrap();
    root.set_child(a).unwrap();

    assert_eq!(root.tick().unwrap(), Status::Inactive);
    assert_eq!(tally.ticks(), 0);
}

#[test]
fn leaf_as_root_child() {
    let mut root = Root::new();
    let (a, tally) = Scripted::new(&[R, S]);
    let a = root.add_leaf(a).unwrap();
    root.set_child(a).unwrap();
    root.initialize().unwrap();

    assert_eq!(root.status(), Status::Running);
    assert_eq!(root.run_until_terminal(10).unwrap(), Status::Success);
    assert_eq!(tally.ticks(), 2);
    assert_eq!(root.ticks(), 3);
}

#[test]
fn run_until_terminal_gives_up_after_max_ticks() {
    let mut root = Root::new();
    let (a, _) = Scripted::always(R);
    let a = root.add_leaf(a).unwrap();
    root.set_child(a).unwrap();
    root.initialize().unwrap();

    assert_eq!(root.run_until_terminal(5).unwrap(), Status::Running);
    assert_eq!(root.ticks(), 5);
}

#[test]
fn reset_cancels_running_work_and_allows_a_rerun() {
    let mut root = Root::new();
    let seq = root.add_composite(CompositeKind::Sequence).unwrap();
    let (a, tally) = Scripted::always(R);
    let a = root.add_leaf(a).unwrap();
    root.add_child(seq, a).unwrap();
    root.set_child(seq).unwrap();
    root.initialize().unwrap();
    root.tick().unwrap();

    root.reset();
    assert_eq!(tally.cancels(), 1);
    assert_eq!(root.status(), Status::Inactive);
    assert_eq!(root.active(), None);
    assert_eq!(root.status_of(seq).unwrap(), Status::Inactive);
    assert_eq!(root.status_of(a).unwrap(), Status::Inactive);

    root.initialize().unwrap();
    assert_eq!(tally.inits(), 2);
    assert_eq!(root.tick().unwrap(), Status::Running);
    assert_eq!(tally.run_ticks(), 1);
}

#[test]
fn reset_keeps_blackboard_values_but_drops_checks() {
    let mut root = Root::new();
    let (a, _) = Scripted::always(R);
    let a = root.add_leaf(a).unwrap();
    root.set_child(a).unwrap();
    root.set_value(ALERT, true);
    root.add_check(a, Box::new(|| false)).unwrap();

    root.reset();

    assert_eq!(root.get_value(ALERT), Ok(&true));
    assert_eq!(root.blackboard().check_count(), 0);
}

#[test]
fn check_for_an_idle_node_is_dropped_without_ticking_it() {
    let mut root = Root::new();
    let seq = root.add_composite(CompositeKind::Sequence).unwrap();
    let (a, _) = Scripted::always(R);
    let (b, tally_b) = Scripted::always(S);
    let a = root.add_leaf(a).unwrap();
    let b = root.add_leaf(b).unwrap();
    root.add_child(seq, a).unwrap();
    root.add_child(seq, b).unwrap();
    root.set_child(seq).unwrap();
    root.initialize().unwrap();
    root.add_check(b, Box::new(|| true)).unwrap();

    root.tick().unwrap();

    assert_eq!(tally_b.ticks(), 0);
    assert!(!root.blackboard().has_check(b));
}

#[test]
fn check_that_never_fires_stays_registered() {
    let mut root = Root::new();
    let (a, tally) = Scripted::always(R);
    let a = root.add_leaf(a).unwrap();
    root.set_child(a).unwrap();
    root.initialize().unwrap();
    root.add_check(a, Box::new(|| false)).unwrap();

    root.tick().unwrap();
    root.tick().unwrap();

    assert_eq!(tally.ticks(), 2);
    assert!(root.blackboard().has_check(a));
}

#[test]
fn check_on_unknown_node_is_rejected() {
    let mut root = Root::new();

    assert_eq!(
        root.add_check(NodeId(7), Box::new(|| true)),
        Err(BtError::UnknownNode { node: NodeId(7) })
    );
}

/// Registers an always-true check for itself on every start.
struct Eager {
    ticks: u32,
}

impl Action for Eager {
    fn initialize(&mut self, ctx: &mut LeafContext<'_>) -> Result<()> {
        ctx.add_check(Box::new(|| true));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
        self.ticks += 1;
        ctx.blackboard_mut().set_value(EAGER_TICKS, self.ticks);
        Ok(ActionStatus::Running)
    }
}

const EAGER_TICKS: BbKey<u32> = BbKey::new("eager_ticks");

#[test]
fn fired_check_ticks_its_leaf_before_the_fast_path() {
    let mut root = Root::new();
    let eager = root.add_leaf(Eager { ticks: 0 }).unwrap();
    root.set_child(eager).unwrap();
    root.initialize().unwrap();
    assert!(root.blackboard().has_check(eager));

    root.tick().unwrap();
    assert_eq!(root.get_value(EAGER_TICKS), Ok(&2));
    assert_eq!(root.blackboard().check_count(), 0);

    root.tick().unwrap();
    assert_eq!(root.get_value(EAGER_TICKS), Ok(&3));
}

#[test]
fn leaf_errors_abort_the_tick() {
    const PATH: BbKey<Vec<u32>> = BbKey::new("path");

    let mut root = Root::from_spec(
        leaf_fn(|ctx| {
            ctx.blackboard_mut().push_stack(PATH, 1)?;
            Ok(ActionStatus::Success)
        }),
        RootConfig::default(),
    )
    .unwrap();
    root.set_value(BbKey::<u32>::new("path"), 5);
    root.initialize().unwrap();

    assert_eq!(root.tick(), Err(BtError::KeyConflict { key: "path" }));
}

#[test]
fn fired_checks_are_unregistered_when_the_tick_errors() {
    const PATH: BbKey<Vec<u32>> = BbKey::new("path");
    const CONFLICT: BbKey<u32> = BbKey::new("path");

    let mut root = Root::from_spec(
        leaf_fn(|ctx| {
            ctx.blackboard_mut().push_stack(PATH, 1)?;
            Ok(ActionStatus::Running)
        }),
        RootConfig::default(),
    )
    .unwrap();
    let leaf = NodeId(0);
    root.set_value(CONFLICT, 5);
    root.initialize().unwrap();
    root.add_check(leaf, Box::new(|| true)).unwrap();

    assert_eq!(root.tick(), Err(BtError::KeyConflict { key: "path" }));
    assert!(!root.blackboard().has_check(leaf));

    // a later registration for the same node must survive the next tick
    root.blackboard_mut().remove_value(CONFLICT).unwrap();
    root.add_check(leaf, Box::new(|| false)).unwrap();
    assert_eq!(root.tick().unwrap(), Status::Running);
    assert!(root.blackboard().has_check(leaf));
    assert_eq!(root.get_value(PATH), Ok(&vec![1]));
}

/// Advances by a millisecond on every reading.
struct Stepping(Cell<Duration>);

impl Clock for Stepping {
    fn now(&self) -> Duration {
        let now = self.0.get();
        self.0.set(now + Duration::from_millis(1));
        now
    }
}

const STAMPS: BbKey<Vec<Duration>> = BbKey::new("stamps");

/// Like `Eager`, but records the time it was ticked at.
struct Stamper;

impl Action for Stamper {
    fn initialize(&mut self, ctx: &mut LeafContext<'_>) -> Result<()> {
        ctx.add_check(Box::new(|| true));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
        let now = ctx.now();
        ctx.blackboard_mut().push_stack(STAMPS, now)?;
        Ok(ActionStatus::Running)
    }
}

#[test]
fn leaves_in_one_tick_share_the_tick_start_reading() {
    let mut root = Root::new().with_clock(Stepping(Cell::new(Duration::ZERO)));
    let stamper = root.add_leaf(Stamper).unwrap();
    root.set_child(stamper).unwrap();
    root.initialize().unwrap();

    // ticked once by its check and once more on the fast path
    root.tick().unwrap();
    let stamps = root.get_value(STAMPS).unwrap().clone();
    assert_eq!(stamps.len(), 2);
    assert_eq!(stamps[0], stamps[1]);

    root.tick().unwrap();
    let stamps = root.get_value(STAMPS).unwrap();
    assert_eq!(stamps.len(), 3);
    assert!(stamps[2] > stamps[1]);
}

#[test]
fn add_child_validates_the_link() {
    let mut root = Root::new();
    let seq = root.add_composite(CompositeKind::Sequence).unwrap();
    let sel = root.add_composite(CompositeKind::Selector).unwrap();
    let (a, _) = Scripted::always(S);
    let (b, _) = Scripted::always(S);
    let a = root.add_leaf(a).unwrap();
    let b = root.add_leaf(b).unwrap();

    assert_eq!(
        root.add_child(a, b),
        Err(BtError::InvalidParent { node: a })
    );
    assert_eq!(
        root.add_child(seq, NodeId(42)),
        Err(BtError::UnknownNode { node: NodeId(42) })
    );
    assert_eq!(
        root.add_child(seq, seq),
        Err(BtError::WouldCycle { node: seq })
    );

    root.add_child(seq, sel).unwrap();
    root.add_child(sel, a).unwrap();
    // seq is an ancestor of a, which is caught before a's kind is looked at
    assert_eq!(
        root.add_child(a, seq),
        Err(BtError::WouldCycle { node: seq })
    );
    assert_eq!(
        root.add_child(sel, seq),
        Err(BtError::WouldCycle { node: seq })
    );
    assert_eq!(
        root.add_child(seq, a),
        Err(BtError::AlreadyAttached { node: a })
    );
    assert_eq!(root.set_child(a), Err(BtError::AlreadyAttached { node: a }));

    assert_eq!(root.children(seq).unwrap(), &[sel]);
    assert_eq!(root.node(a).unwrap().parent(), Some(sel));
}

#[test]
fn from_spec_builds_nodes_in_depth_first_order() {
    let spec = sequence(vec![
        condition(|bb| bb.try_get(ALERT).ok().flatten().copied().unwrap_or(false)),
        leaf(Scripted::always(S).0),
    ]);
    let mut root = Root::from_spec(spec, RootConfig::default()).unwrap();

    assert_eq!(root.len(), 3);
    assert_eq!(root.child(), Some(NodeId(0)));
    assert_eq!(root.children(NodeId(0)).unwrap(), &[NodeId(1), NodeId(2)]);
    assert!(matches!(
        root.kind(NodeId(0)).unwrap(),
        NodeKind::Composite {
            kind: CompositeKind::Sequence,
            ..
        }
    ));
    assert!(matches!(root.kind(NodeId(2)).unwrap(), NodeKind::Leaf(_)));

    root.initialize().unwrap();
    assert_eq!(root.run_until_terminal(10).unwrap(), Status::Failure);

    root.reset();
    root.set_value(ALERT, true);
    root.initialize().unwrap();
    assert_eq!(root.run_until_terminal(10).unwrap(), Status::Success);
}
