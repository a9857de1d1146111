//! Effect generators with compile-time known variants
//!
//! Wave, Chaser and Breath each live in their own slot with an independent
//! lifecycle. Switching an effect off never cuts the light: the slot moves
//! to `Fading` and only becomes `Inactive` once the levels it last wrote
//! reached zero.

mod breath;
mod chaser;
pub mod fade;
mod wave;

pub use breath::{BreathEffect, intensity_at};
pub use chaser::ChaserEffect;
pub use fade::FadeOut;
pub use wave::WaveEffect;

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::{
    CHASER_STEP, ControllerConfig, DEFAULT_BREATH_INCREMENT, EffectTimings, FADE_STEP,
};

const EFFECT_NAME_WAVE: &str = "wave";
const EFFECT_NAME_CHASER: &str = "chaser";
const EFFECT_NAME_BREATH: &str = "breath";

pub trait Effect {
    /// Called when the effect is switched on; restarts its cadence
    fn activate(&mut self, now: Instant);

    /// Write one frame of output while active
    fn render(&mut self, now: Instant, channels: &mut [u8]);

    /// Called when the effect is switched off
    fn begin_fade(&mut self, now: Instant);

    /// Write one frame of the fade-out
    ///
    /// Only the levels the effect wrote itself decay. Returns `true` once
    /// they are all zero.
    fn fade(&mut self, now: Instant, channels: &mut [u8]) -> bool;
}

/// Lifecycle of a single effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Inactive,
    Active,
    Fading,
}

/// Known effects, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectId {
    Wave,
    Chaser,
    Breath,
}

impl EffectId {
    pub const ALL: [Self; 3] = [Self::Wave, Self::Chaser, Self::Breath];

    /// Name used in the command grammar
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wave => EFFECT_NAME_WAVE,
            Self::Chaser => EFFECT_NAME_CHASER,
            Self::Breath => EFFECT_NAME_BREATH,
        }
    }

    /// Look up an effect by its command name
    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            EFFECT_NAME_WAVE => Some(Self::Wave),
            EFFECT_NAME_CHASER => Some(Self::Chaser),
            EFFECT_NAME_BREATH => Some(Self::Breath),
            _ => None,
        }
    }
}

/// What happens when several effects are switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyPolicy {
    /// Effects stack up; each frame runs Wave, then Chaser, then Breath and
    /// later ones overwrite the channels written by earlier ones
    #[default]
    Layered,
    /// Switching an effect on sends every other active effect into its fade;
    /// the new effect starts rendering once those fades are done
    Exclusive,
}

/// An effect together with its lifecycle
#[derive(Debug, Clone)]
pub struct EffectSlot<E> {
    effect: E,
    state: Lifecycle,
}

impl<E: Effect> EffectSlot<E> {
    /// Wrap an effect, initially inactive
    pub const fn new(effect: E) -> Self {
        Self {
            effect,
            state: Lifecycle::Inactive,
        }
    }

    /// Current lifecycle state
    pub const fn state(&self) -> Lifecycle {
        self.state
    }

    /// The wrapped effect
    pub const fn effect(&self) -> &E {
        &self.effect
    }

    /// The wrapped effect, mutably
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Switch on, or restart the cadence when already on
    pub fn activate(&mut self, now: Instant) {
        self.state = Lifecycle::Active;
        self.effect.activate(now);
    }

    /// Start the fade-out; no-op unless active
    pub fn deactivate(&mut self, now: Instant) {
        if self.state == Lifecycle::Active {
            self.state = Lifecycle::Fading;
            self.effect.begin_fade(now);
        }
    }

    /// Run exactly one path: render when active, fade when fading
    pub fn update(&mut self, now: Instant, channels: &mut [u8]) {
        match self.state {
            Lifecycle::Active => self.effect.render(now, channels),
            Lifecycle::Fading => {
                if self.effect.fade(now, channels) {
                    self.state = Lifecycle::Inactive;
                }
            }
            Lifecycle::Inactive => {}
        }
    }
}

/// Owns every effect generator and applies the concurrency policy
#[derive(Debug, Clone)]
pub struct EffectEngine<const N: usize> {
    policy: ConcurrencyPolicy,
    wave: EffectSlot<WaveEffect>,
    chaser: EffectSlot<ChaserEffect<N>>,
    breath: EffectSlot<BreathEffect<N>>,
}

impl<const N: usize> Default for EffectEngine<N> {
    fn default() -> Self {
        Self::new(&ControllerConfig::default())
    }
}

impl<const N: usize> EffectEngine<N> {
    /// Create every effect from the configured timings, all inactive
    pub fn new(config: &ControllerConfig) -> Self {
        let EffectTimings {
            wave,
            chaser,
            breath,
            fade,
        } = config.effects;
        Self {
            policy: config.policy,
            wave: EffectSlot::new(WaveEffect::new(wave, FadeOut::new(fade, FADE_STEP))),
            chaser: EffectSlot::new(ChaserEffect::new(
                chaser,
                CHASER_STEP,
                FadeOut::new(fade, FADE_STEP),
            )),
            breath: EffectSlot::new(BreathEffect::new(
                breath,
                DEFAULT_BREATH_INCREMENT,
                FadeOut::new(fade, FADE_STEP),
            )),
        }
    }

    /// Current concurrency policy
    pub const fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Change the concurrency policy, effective on the next activation
    pub fn set_policy(&mut self, policy: ConcurrencyPolicy) {
        self.policy = policy;
    }

    /// Lifecycle state of an effect
    pub const fn state(&self, id: EffectId) -> Lifecycle {
        match id {
            EffectId::Wave => self.wave.state(),
            EffectId::Chaser => self.chaser.state(),
            EffectId::Breath => self.breath.state(),
        }
    }

    /// Whether any effect is active or still fading
    pub fn is_running(&self) -> bool {
        EffectId::ALL
            .iter()
            .any(|id| self.state(*id) != Lifecycle::Inactive)
    }

    /// Switch an effect on
    ///
    /// With [`ConcurrencyPolicy::Exclusive`] every other active effect starts
    /// fading.
    pub fn activate(&mut self, id: EffectId, now: Instant) {
        if self.policy == ConcurrencyPolicy::Exclusive {
            for other in EffectId::ALL {
                if other != id {
                    self.deactivate(other, now);
                }
            }
        }

        #[cfg(feature = "esp32-log")]
        println!("[EffectEngine.activate] {}", id.as_str());

        match id {
            EffectId::Wave => self.wave.activate(now),
            EffectId::Chaser => self.chaser.activate(now),
            EffectId::Breath => self.breath.activate(now),
        }
    }

    /// Send an active effect into its fade-out
    pub fn deactivate(&mut self, id: EffectId, now: Instant) {
        match id {
            EffectId::Wave => self.wave.deactivate(now),
            EffectId::Chaser => self.chaser.deactivate(now),
            EffectId::Breath => self.breath.deactivate(now),
        }
    }

    /// Active goes to fading, anything else is switched on
    ///
    /// Returns the new lifecycle state.
    pub fn toggle(&mut self, id: EffectId, now: Instant) -> Lifecycle {
        if self.state(id) == Lifecycle::Active {
            #[cfg(feature = "esp32-log")]
            println!("[EffectEngine.toggle] {} fading out", id.as_str());
            self.deactivate(id, now);
        } else {
            self.activate(id, now);
        }
        self.state(id)
    }

    /// Whether any effect is still fading out
    pub fn is_fading(&self) -> bool {
        EffectId::ALL
            .iter()
            .any(|id| self.state(*id) == Lifecycle::Fading)
    }

    /// Run one frame of every effect in Wave, Chaser, Breath order
    ///
    /// With [`ConcurrencyPolicy::Exclusive`] the active effect holds off
    /// until every fade-out has finished.
    pub fn update(&mut self, now: Instant, channels: &mut [u8]) {
        let handoff = self.policy == ConcurrencyPolicy::Exclusive && self.is_fading();
        for id in EffectId::ALL {
            if handoff && self.state(id) == Lifecycle::Active {
                continue;
            }
            match id {
                EffectId::Wave => self.wave.update(now, channels),
                EffectId::Chaser => self.chaser.update(now, channels),
                EffectId::Breath => self.breath.update(now, channels),
            }
        }
    }

    /// Step interval of an effect
    pub fn set_interval(&mut self, id: EffectId, interval: Duration) {
        match id {
            EffectId::Wave => self.wave.effect_mut().set_interval(interval),
            EffectId::Chaser => self.chaser.effect_mut().set_interval(interval),
            EffectId::Breath => self.breath.effect_mut().set_interval(interval),
        }
    }

    /// Fade-out cadence of every effect
    pub fn set_fade_period(&mut self, period: Duration) {
        self.wave.effect_mut().set_fade_period(period);
        self.chaser.effect_mut().set_fade_period(period);
        self.breath.effect_mut().set_fade_period(period);
    }

    /// The wave generator
    pub const fn wave(&self) -> &WaveEffect {
        self.wave.effect()
    }

    /// The chaser generator
    pub const fn chaser(&self) -> &ChaserEffect<N> {
        self.chaser.effect()
    }

    /// The breath generator
    pub const fn breath(&self) -> &BreathEffect<N> {
        self.breath.effect()
    }

    /// The breath generator, mutably
    pub fn breath_mut(&mut self) -> &mut BreathEffect<N> {
        self.breath.effect_mut()
    }
}
