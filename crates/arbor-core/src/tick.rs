use std::time::Duration;

/// Per-tick information handed to leaf actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    /// Number of root ticks started so far, counting the current one.
    pub tick: u64,
    /// Clock reading taken at the start of the tick.
    pub now: Duration,
}
