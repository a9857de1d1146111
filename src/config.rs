//! Build-time defaults and runtime configuration.

use embassy_time::Duration;

use crate::effect::ConcurrencyPolicy;

/// Time between DMX frames
pub const DMX_INTERVAL: Duration = Duration::from_millis(30);

/// BREAK length the transmitter holds the line low
pub const DEFAULT_BREAK_US: u32 = 120;
/// MARK-AFTER-BREAK length
pub const DEFAULT_MAB_US: u32 = 12;

pub const DEFAULT_WAVE_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_CHASER_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_BREATH_INTERVAL: Duration = Duration::from_millis(30);
/// Radians per breath step
pub const DEFAULT_BREATH_INCREMENT: f32 = 0.05;

/// Cadence of the fade-out decay
pub const FADE_INTERVAL: Duration = Duration::from_millis(30);
/// Amount removed from every lit channel per fade step
pub const FADE_STEP: u8 = 15;
/// Chaser accumulator change per frame
pub const CHASER_STEP: f32 = 15.0;

/// Inter-byte silence that marks a BREAK on the receive side
pub const RX_BREAK_GAP: Duration = Duration::from_micros(120);
/// First forwarded channel on the receive side (1-based)
pub const RX_START_CHANNEL: u16 = 1;
/// Period of the receiver's debug dump
pub const RX_REPORT_INTERVAL: Duration = Duration::from_millis(1000);

/// Step cadences of the effect generators
#[derive(Debug, Clone, Copy)]
pub struct EffectTimings {
    pub wave: Duration,
    pub chaser: Duration,
    pub breath: Duration,
    /// Fade-out cadence, shared value but one timer per effect
    pub fade: Duration,
}

impl Default for EffectTimings {
    fn default() -> Self {
        Self {
            wave: DEFAULT_WAVE_INTERVAL,
            chaser: DEFAULT_CHASER_INTERVAL,
            breath: DEFAULT_BREATH_INTERVAL,
            fade: FADE_INTERVAL,
        }
    }
}

/// Configuration for the controller
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerConfig {
    pub effects: EffectTimings,
    pub policy: ConcurrencyPolicy,
}
