use std::cell::RefCell;
use std::rc::Rc;

use arbor_bt::builder::{leaf, sequence};
use arbor_bt::{
    from_fn, ActionStatus, NodeId, Root, RootConfig, Status, TraceEvent, TraceSink,
};

#[derive(Clone, Default)]
struct RcSink(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceSink for RcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

fn one_step_sequence(config: RootConfig) -> Root {
    let spec = sequence(vec![leaf(from_fn(|_| Ok(ActionStatus::Success)))]);
    Root::from_spec(spec, config).unwrap()
}

#[test]
fn trace_log_is_off_by_default() {
    let mut root = one_step_sequence(RootConfig::default());
    root.initialize().unwrap();
    root.tick().unwrap();

    assert!(root.trace_log().is_none());
}

#[test]
fn trace_log_records_fast_path_and_traversal() {
    let mut root = one_step_sequence(RootConfig {
        trace: true,
        ..RootConfig::default()
    });
    root.initialize().unwrap();
    assert_eq!(root.run_until_terminal(10).unwrap(), Status::Success);

    let seq = NodeId(0);
    let a = NodeId(1);
    let expected = vec![
        TraceEvent::new(0, "bt.init").with_node(seq),
        TraceEvent::new(1, "bt.tick.fast").with_node(a),
        TraceEvent::new(1, "bt.node.done")
            .with_node(a)
            .with_status(Status::Success),
        TraceEvent::new(2, "bt.tick.traverse").with_node(seq),
        TraceEvent::new(2, "bt.node.done")
            .with_node(seq)
            .with_status(Status::Success),
    ];

    let log = root.trace_log().unwrap();
    assert_eq!(log.events, expected);
    assert_eq!(log.with_tag("bt.node.done").count(), 2);
}

#[test]
fn sink_receives_fired_checks() {
    let mut root = one_step_sequence(RootConfig::default());
    let handle = RcSink::default();
    let shared = handle.0.clone();
    root.set_trace_sink(Box::new(handle));
    root.initialize().unwrap();
    root.add_check(NodeId(1), Box::new(|| true)).unwrap();

    root.tick().unwrap();

    let events = shared.borrow();
    assert_eq!(events[1].tag, "bt.check.fired");
    assert_eq!(events[1].node, Some(NodeId(1)));
    assert_eq!(events[1].tick, 1);
}
