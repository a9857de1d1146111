//! Breath effect
//!
//! Sinusoidal intensity swing between a lower and upper bound, applied to a
//! selectable subset of channels. Channels outside the subset are left alone.

use core::f32::consts::TAU;

use embassy_time::{Duration, Instant};

use super::Effect;
use super::fade::FadeOut;
use crate::timer::IntervalTimer;

/// Intensity for a phase: `min + (sin(phase) + 1) / 2 * (max - min)`, truncated
pub fn intensity_at(phase: f32, min: u8, max: u8) -> u8 {
    let swing = (libm::sinf(phase) + 1.0) / 2.0;
    let low = f32::from(min);
    let value = low + swing * (f32::from(max) - low);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        value as u8
    }
}

#[derive(Debug, Clone)]
pub struct BreathEffect<const N: usize> {
    timer: IntervalTimer,
    phase: f32,
    increment: f32,
    min: u8,
    max: u8,
    members: [bool; N],
    /// Level last written to the member channels
    output: u8,
    fade: FadeOut,
}

impl<const N: usize> BreathEffect<N> {
    /// Create a breath advancing `increment` radians every `interval`
    pub const fn new(interval: Duration, increment: f32, fade: FadeOut) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            phase: 0.0,
            increment,
            min: 0,
            max: u8::MAX,
            members: [true; N],
            output: 0,
            fade,
        }
    }

    /// Current phase, in `[0, TAU)`
    pub const fn phase(&self) -> f32 {
        self.phase
    }

    /// Phase advance per step
    pub const fn increment(&self) -> f32 {
        self.increment
    }

    /// Lower and upper intensity bound
    pub const fn bounds(&self) -> (u8, u8) {
        (self.min, self.max)
    }

    /// Membership flag per channel
    pub const fn members(&self) -> &[bool; N] {
        &self.members
    }

    /// Intensity the member channels get at the current phase
    pub fn level(&self) -> u8 {
        intensity_at(self.phase, self.min, self.max)
    }

    /// Phase advance per step, in radians
    pub fn set_increment(&mut self, increment: f32) {
        self.increment = increment;
    }

    /// Lower bound; refused when above the upper bound
    pub fn set_min(&mut self, min: u8) -> bool {
        if min > self.max {
            return false;
        }
        self.min = min;
        true
    }

    /// Upper bound; refused when below the lower bound
    pub fn set_max(&mut self, max: u8) -> bool {
        if max < self.min {
            return false;
        }
        self.max = max;
        true
    }

    /// Replace the member set with the listed 1-based channels
    ///
    /// Entries outside `1..=N` are skipped.
    pub fn set_members(&mut self, channels: &[u16]) {
        self.members = [false; N];
        for &channel in channels {
            if let Some(member) = usize::from(channel)
                .checked_sub(1)
                .and_then(|index| self.members.get_mut(index))
            {
                *member = true;
            }
        }
    }

    /// Change the step interval
    pub fn set_interval(&mut self, interval: Duration) {
        self.timer.set_period(interval);
    }

    /// Change the fade-out cadence
    pub fn set_fade_period(&mut self, period: Duration) {
        self.fade.set_period(period);
    }

    fn member_channels<'a>(
        members: &'a [bool; N],
        channels: &'a mut [u8],
    ) -> impl Iterator<Item = &'a mut u8> {
        channels
            .iter_mut()
            .zip(members.iter())
            .filter_map(|(channel, member)| member.then_some(channel))
    }
}

impl<const N: usize> Effect for BreathEffect<N> {
    fn activate(&mut self, _now: Instant) {
        self.phase = 0.0;
        self.timer.prime();
    }

    fn render(&mut self, now: Instant, channels: &mut [u8]) {
        if self.timer.poll(now) {
            self.phase = libm::fmodf(self.phase + self.increment, TAU);
        }

        self.output = self.level();
        for channel in Self::member_channels(&self.members, channels) {
            *channel = self.output;
        }
    }

    fn begin_fade(&mut self, now: Instant) {
        self.fade.start(now);
    }

    fn fade(&mut self, now: Instant, channels: &mut [u8]) -> bool {
        if !self.fade.is_due(now) {
            return false;
        }
        self.output = self.output.saturating_sub(self.fade.step());
        for channel in Self::member_channels(&self.members, channels) {
            *channel = self.output;
        }
        self.output == 0
    }
}
