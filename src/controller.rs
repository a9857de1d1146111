//! The controller aggregate: channel store, effects and indicator.
//!
//! Everything that used to be loose firmware state lives here and is owned by
//! a single loop; commands and frame updates take `&mut self` in turn, so no
//! locking is needed.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::command::{Command, EffectCommand};
use crate::config::ControllerConfig;
use crate::effect::{EffectEngine, EffectId};
use crate::frame::DmxFrame;
use crate::universe::Universe;

/// Payloads for the outbound transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast<const N: usize> {
    /// New indicator state
    Indicator(bool),
    /// Channel values for UI mirroring
    Channels([u8; N]),
}

/// Wire text of the indicator, as broadcast to clients
pub const fn indicator_text(state: bool) -> &'static str {
    if state { "1" } else { "0" }
}

/// Text substituted for the `STATE` placeholder of the control page
pub const fn template_state(state: bool) -> &'static str {
    if state { "ON" } else { "OFF" }
}

pub struct Controller<const N: usize> {
    universe: Universe<N>,
    effects: EffectEngine<N>,
    indicator: bool,
    client_present: bool,
    /// Channels changed since the last snapshot broadcast
    dirty: bool,
}

impl<const N: usize> Default for Controller<N> {
    fn default() -> Self {
        Self::new(&ControllerConfig::default())
    }
}

impl<const N: usize> Controller<N> {
    /// Create a controller with every channel at zero
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            universe: Universe::new(),
            effects: EffectEngine::new(config),
            indicator: false,
            client_present: false,
            dirty: false,
        }
    }

    /// The channel store
    pub const fn universe(&self) -> &Universe<N> {
        &self.universe
    }

    /// The effect engine
    pub const fn effects(&self) -> &EffectEngine<N> {
        &self.effects
    }

    /// The effect engine, mutably
    pub fn effects_mut(&mut self) -> &mut EffectEngine<N> {
        &mut self.effects
    }

    /// Current indicator state
    pub const fn indicator(&self) -> bool {
        self.indicator
    }

    /// Tell the controller whether any UI client is connected
    pub fn set_client_present(&mut self, present: bool) {
        if present && !self.client_present {
            // A fresh client needs the full picture
            self.dirty = true;
        }
        self.client_present = present;
    }

    /// Parse and apply a text command
    ///
    /// Malformed or unknown commands are ignored.
    pub fn apply_text(&mut self, text: &str, now: Instant) -> Option<Broadcast<N>> {
        match Command::parse(text) {
            Ok(command) => self.apply(&command, now),
            Err(_error) => {
                #[cfg(feature = "esp32-log")]
                println!("[Controller.apply_text] ignoring {:?}: {}", text, _error);
                None
            }
        }
    }

    /// Apply a validated command
    ///
    /// Returns a payload that should be broadcast to clients, if any.
    pub fn apply(&mut self, command: &Command, now: Instant) -> Option<Broadcast<N>> {
        match command {
            Command::Toggle => {
                self.indicator = !self.indicator;
                return Some(Broadcast::Indicator(self.indicator));
            }
            Command::SetChannel { channel, value } => {
                let before = self.universe.get(*channel);
                if self.universe.set(*channel, *value) {
                    self.dirty |= before != self.universe.get(*channel);
                    #[cfg(feature = "esp32-log")]
                    println!("[Controller.apply] channel {} -> {}", channel, value);
                }
            }
            Command::Effect(id, effect_command) => {
                self.apply_effect(*id, effect_command, now);
            }
        }
        None
    }

    fn apply_effect(&mut self, id: EffectId, command: &EffectCommand, now: Instant) {
        match (id, command) {
            (_, EffectCommand::Toggle) => {
                self.effects.toggle(id, now);
            }
            (EffectId::Breath, EffectCommand::Speed(percent)) => {
                #[allow(clippy::cast_precision_loss)]
                let increment = *percent as f32 / 100.0;
                self.effects.breath_mut().set_increment(increment);
            }
            (_, EffectCommand::Speed(millis)) => {
                self.effects
                    .set_interval(id, Duration::from_millis(u64::from(*millis)));
            }
            (EffectId::Breath, EffectCommand::Min(min)) => {
                let _accepted = self.effects.breath_mut().set_min(*min);
                #[cfg(feature = "esp32-log")]
                if !_accepted {
                    println!("[Controller.apply] breath min {} above max, ignored", min);
                }
            }
            (EffectId::Breath, EffectCommand::Max(max)) => {
                let _accepted = self.effects.breath_mut().set_max(*max);
                #[cfg(feature = "esp32-log")]
                if !_accepted {
                    println!("[Controller.apply] breath max {} below min, ignored", max);
                }
            }
            (EffectId::Breath, EffectCommand::Channels(channels)) => {
                self.effects.breath_mut().set_members(channels);
            }
            // The parser only produces bounds and member lists for breath
            _ => {}
        }
    }

    /// Advance effects by one frame and build the frame to transmit
    pub fn update(&mut self, now: Instant) -> DmxFrame {
        if self.effects.is_running() {
            let before = self.universe.snapshot();
            self.effects.update(now, self.universe.as_mut_slice());
            self.dirty |= before != self.universe.snapshot();
        }
        self.universe.frame()
    }

    /// Channel snapshot for a connected client, when something changed
    pub fn take_snapshot(&mut self) -> Option<Broadcast<N>> {
        if !self.client_present || !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(Broadcast::Channels(self.universe.snapshot()))
    }
}
