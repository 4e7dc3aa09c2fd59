//! Demo tree: walk a route of waypoints, stopping to look around whenever an
//! alert is raised. The tree succeeds once the route is used up.

use std::time::Duration;

use arbor_bt::builder::{
    condition, leaf_fn, random_selector, selector, sequence, timeout, until_fail, wait,
};
use arbor_bt::{ActionStatus, BbKey, LeafContext, NodeSpec, Result, Root};
use tracing::info;

pub const WAYPOINTS: &[&str] = &["gate", "yard", "tower", "well", "gate"];

pub const ROUTE: BbKey<Vec<&'static str>> = BbKey::new("route");
pub const TARGET: BbKey<&'static str> = BbKey::new("target");
pub const ALERT: BbKey<bool> = BbKey::new("alert");

pub fn tree(travel: Duration) -> NodeSpec {
    until_fail(selector(vec![
        sequence(vec![
            condition(|bb| matches!(bb.try_get(ALERT), Ok(Some(&true)))),
            random_selector(vec![look("left", travel / 4), look("right", travel / 3)]),
            leaf_fn(all_clear),
        ]),
        sequence(vec![
            leaf_fn(next_waypoint),
            timeout(travel * 2, wait(travel)),
            leaf_fn(arrive),
        ]),
    ]))
}

/// Stacks the route so that `waypoints[0]` is popped first.
pub fn load_route(root: &mut Root, waypoints: &[&'static str]) -> Result<()> {
    root.flush_stack(ROUTE)?;
    for waypoint in waypoints.iter().rev() {
        root.push_stack(ROUTE, *waypoint)?;
    }
    Ok(())
}

fn look(direction: &'static str, linger: Duration) -> NodeSpec {
    sequence(vec![
        leaf_fn(move |ctx| {
            info!(tick = ctx.tick().tick, direction, "looking around");
            Ok(ActionStatus::Success)
        }),
        wait(linger),
    ])
}

fn all_clear(ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
    ctx.blackboard_mut().set_value(ALERT, false);
    info!(tick = ctx.tick().tick, "all clear");
    Ok(ActionStatus::Success)
}

fn next_waypoint(ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
    match ctx.blackboard_mut().pop_stack(ROUTE)? {
        Some(waypoint) => {
            info!(tick = ctx.tick().tick, waypoint, "heading out");
            ctx.blackboard_mut().set_value(TARGET, waypoint);
            Ok(ActionStatus::Success)
        }
        None => {
            info!(tick = ctx.tick().tick, "route finished");
            Ok(ActionStatus::Failure)
        }
    }
}

fn arrive(ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
    let waypoint = *ctx.blackboard().get_value(TARGET)?;
    info!(tick = ctx.tick().tick, waypoint, "arrived");
    Ok(ActionStatus::Success)
}
