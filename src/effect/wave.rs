//! Wave effect
//!
//! A single channel at full intensity that hops to the next channel on every
//! step, wrapping around at the end. Hard cut, no interpolation between
//! neighbours.

use embassy_time::{Duration, Instant};

use super::Effect;
use super::fade::FadeOut;
use crate::timer::IntervalTimer;

const LIT: u8 = u8::MAX;

#[derive(Debug, Clone)]
pub struct WaveEffect {
    timer: IntervalTimer,
    lit: Option<usize>,
    /// Level last written to the lit channel
    level: u8,
    fade: FadeOut,
}

impl WaveEffect {
    /// Create a wave stepping every `interval`
    pub const fn new(interval: Duration, fade: FadeOut) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            lit: None,
            level: 0,
            fade,
        }
    }

    /// Index of the lit channel, `None` before the first step
    pub const fn lit(&self) -> Option<usize> {
        self.lit
    }

    /// Step interval
    pub const fn interval(&self) -> Duration {
        self.timer.period()
    }

    /// Change the step interval, effective from the next step
    pub fn set_interval(&mut self, interval: Duration) {
        self.timer.set_period(interval);
    }

    /// Change the fade-out cadence
    pub fn set_fade_period(&mut self, period: Duration) {
        self.fade.set_period(period);
    }
}

impl Effect for WaveEffect {
    fn activate(&mut self, _now: Instant) {
        // Light the first channel on the very next frame
        self.lit = None;
        self.timer.prime();
    }

    fn render(&mut self, now: Instant, channels: &mut [u8]) {
        if channels.is_empty() || !self.timer.poll(now) {
            return;
        }

        let next = self.lit.map_or(0, |lit| (lit + 1) % channels.len());
        channels.fill(0);
        channels[next] = LIT;
        self.lit = Some(next);
        self.level = LIT;
    }

    fn begin_fade(&mut self, now: Instant) {
        self.fade.start(now);
    }

    fn fade(&mut self, now: Instant, channels: &mut [u8]) -> bool {
        if !self.fade.is_due(now) {
            return false;
        }
        self.level = self.level.saturating_sub(self.fade.step());
        if let Some(channel) = self.lit.and_then(|lit| channels.get_mut(lit)) {
            *channel = self.level;
        }
        self.level == 0
    }
}
