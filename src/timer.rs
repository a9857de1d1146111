//! Monotonic interval timers.
//!
//! Every cadence in the controller (frame period, effect steps, fade steps)
//! owns one of these. They never share a timestamp.

use embassy_time::{Duration, Instant};

/// Fires once every `period`, measured from the last time it fired
///
/// Late polls are coalesced: a timer polled several periods late fires once
/// and restarts from the poll time.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    period: Duration,
    last: Option<Instant>,
}

impl IntervalTimer {
    /// Create a timer that fires on its first poll
    pub const fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Time between fires
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Change the period, measured from the last fire
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Start counting from `now`; the first fire is one period later
    pub fn restart(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Make the next poll fire regardless of elapsed time
    pub fn prime(&mut self) {
        self.last = None;
    }

    /// Check whether the period has elapsed, restarting the timer if so
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.period,
        };
        if due {
            self.last = Some(now);
        }
        due
    }
}
