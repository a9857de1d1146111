//! Chaser effect
//!
//! Like the wave, one channel is "current" at a time, but levels move by a
//! fixed amount per frame instead of jumping. The current channel rises
//! towards full while every other channel falls towards zero, which gives a
//! cross-fading chase.

use embassy_time::{Duration, Instant};

use super::Effect;
use super::fade::{FadeOut, decay_levels};
use crate::timer::IntervalTimer;

const CEILING: f32 = 255.0;

#[derive(Debug, Clone)]
pub struct ChaserEffect<const N: usize> {
    timer: IntervalTimer,
    position: usize,
    step: f32,
    /// Continuous channel levels, truncated on output
    levels: [f32; N],
    fade: FadeOut,
}

impl<const N: usize> ChaserEffect<N> {
    /// Create a chaser advancing every `interval`, levels moving `step` per frame
    pub const fn new(interval: Duration, step: f32, fade: FadeOut) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            position: 0,
            step,
            levels: [0.0; N],
            fade,
        }
    }

    /// Channel index currently rising
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Accumulated level per channel
    pub const fn levels(&self) -> &[f32; N] {
        &self.levels
    }

    /// Position advance interval
    pub const fn interval(&self) -> Duration {
        self.timer.period()
    }

    /// Change the advance interval
    pub fn set_interval(&mut self, interval: Duration) {
        self.timer.set_period(interval);
    }

    /// Change the fade-out cadence
    pub fn set_fade_period(&mut self, period: Duration) {
        self.fade.set_period(period);
    }

    fn write(&self, channels: &mut [u8]) {
        for (channel, level) in channels.iter_mut().zip(self.levels.iter()) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = *level as u8;
            }
        }
    }
}

impl<const N: usize> Effect for ChaserEffect<N> {
    fn activate(&mut self, now: Instant) {
        self.position = 0;
        self.timer.restart(now);
    }

    fn render(&mut self, now: Instant, channels: &mut [u8]) {
        if N == 0 {
            return;
        }

        if self.timer.poll(now) {
            self.position = (self.position + 1) % N;
        }

        for (index, level) in self.levels.iter_mut().enumerate() {
            *level = if index == self.position {
                (*level + self.step).min(CEILING)
            } else {
                (*level - self.step).max(0.0)
            };
        }
        self.write(channels);
    }

    fn begin_fade(&mut self, now: Instant) {
        self.fade.start(now);
    }

    fn fade(&mut self, now: Instant, channels: &mut [u8]) -> bool {
        if !self.fade.is_due(now) {
            return false;
        }
        let dark = decay_levels(self.levels.iter_mut(), f32::from(self.fade.step()));
        self.write(channels);
        dark
    }
}
