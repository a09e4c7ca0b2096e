//! Timer capability: one-shot and repeating callbacks addressed by handle.

use std::time::Duration;

/// Handle of a scheduled timer, unique per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Schedules timers whose expiry the host reports back to the owning widget
/// through its `on_timer` method.
pub trait Timers {
    /// Monotonic time since the host started.
    fn now(&self) -> Duration;

    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    fn set_interval(&mut self, period: Duration) -> TimerId;

    /// Cancel a timer. Unknown or already fired handles are ignored.
    fn clear(&mut self, id: TimerId);
}
