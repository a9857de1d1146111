//! Fade-out decay shared by every generator
//!
//! When an effect is switched off its channels do not cut to black; the
//! levels the effect last wrote lose a fixed step on every fade tick until
//! they reach zero. Channels the effect never drove are left alone.

use embassy_time::{Duration, Instant};

use crate::timer::IntervalTimer;

/// Fade-out cadence owned by a single effect
#[derive(Debug, Clone, Copy)]
pub struct FadeOut {
    timer: IntervalTimer,
    step: u8,
}

impl FadeOut {
    /// Create a fade removing `step` every `period`
    pub const fn new(period: Duration, step: u8) -> Self {
        Self {
            timer: IntervalTimer::new(period),
            step,
        }
    }

    /// Start fading, the first decay happens one period after `now`
    pub fn start(&mut self, now: Instant) {
        self.timer.restart(now);
    }

    /// Change the decay cadence
    pub fn set_period(&mut self, period: Duration) {
        self.timer.set_period(period);
    }

    /// Amount removed per decay
    pub const fn step(&self) -> u8 {
        self.step
    }

    /// Whether a decay step is due at `now`
    pub fn is_due(&mut self, now: Instant) -> bool {
        self.timer.poll(now)
    }
}

/// Subtract `step` from every level, clamping at zero
///
/// Returns `true` once all levels are zero.
pub fn decay_levels<'a>(levels: impl IntoIterator<Item = &'a mut f32>, step: f32) -> bool {
    let mut lit = false;
    for level in levels {
        *level = (*level - step).max(0.0);
        lit |= *level > 0.0;
    }
    !lit
}
