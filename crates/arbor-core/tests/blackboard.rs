use arbor_core::{BbKey, Blackboard, BtError};

#[test]
fn blackboard_set_get_remove_roundtrip() {
    let k_u32 = BbKey::<u32>::new("ammo");
    let k_str = BbKey::<String>::new("target");

    let mut bb = Blackboard::new();
    assert!(!bb.contains(k_u32));

    bb.set_value(k_u32, 123);
    bb.set_value(k_str, "hello".to_string());

    assert_eq!(bb.get_value(k_u32).copied(), Ok(123));
    assert_eq!(bb.get_value(k_str).map(|s| s.as_str()), Ok("hello"));

    *bb.get_value_mut(k_u32).unwrap() += 1;
    assert_eq!(bb.remove_value(k_u32), Ok(124));
    assert_eq!(bb.get_value(k_u32), Err(BtError::MissingKey { key: "ammo" }));
    assert_eq!(bb.try_get(k_u32), Ok(None));
}

#[test]
fn blackboard_type_mismatch_is_an_error() {
    let mut bb = Blackboard::new();
    bb.set_value(BbKey::<u32>::new("hp"), 1u32);

    assert_eq!(
        bb.get_value(BbKey::<i32>::new("hp")),
        Err(BtError::TypeMismatch { key: "hp" })
    );
}

#[test]
fn stacks_are_shared_by_name() {
    const WAYPOINTS: BbKey<Vec<(i32, i32)>> = BbKey::new("waypoints");

    let mut bb = Blackboard::new();
    bb.push_stack(WAYPOINTS, (0, 0)).unwrap();
    bb.push_stack(WAYPOINTS, (4, 2)).unwrap();

    assert_eq!(bb.get_value(WAYPOINTS).map(Vec::len), Ok(2));
    assert_eq!(bb.pop_stack(WAYPOINTS), Ok(Some((4, 2))));

    // a scalar stored under the same name is not a stack
    let scalar = BbKey::<u8>::new("waypoints");
    bb.set_value(scalar, 9);
    assert_eq!(
        bb.push_stack(WAYPOINTS, (1, 1)),
        Err(BtError::KeyConflict { key: "waypoints" })
    );
    assert_eq!(
        bb.pop_stack(WAYPOINTS),
        Err(BtError::KeyConflict { key: "waypoints" })
    );
}

#[test]
fn clear_keeps_checks() {
    let mut bb = Blackboard::new();
    bb.set_value(BbKey::<bool>::new("alert"), true);
    bb.add_check(arbor_core::NodeId(0), Box::new(|| false));

    bb.clear();

    assert!(!bb.contains(BbKey::<bool>::new("alert")));
    assert_eq!(bb.check_count(), 1);
}
