//! Text command grammar.
//!
//! Commands arrive as complete strings from the transport and are validated
//! here once; the controller only ever sees a typed [`Command`].
//!
//! ```text
//! toggle
//! <n>:<v>
//! wave:toggle | wave:speed:<ms>
//! chaser:toggle | chaser:speed:<ms>
//! breath:toggle | breath:speed:<pct> | breath:min:<v> | breath:max:<v>
//! breath:channels:<n>,<n>,...
//! ```

use core::fmt;
use core::str::FromStr;

use heapless::Vec;

use crate::effect::EffectId;

/// Most channels a `breath:channels` list may name
pub const MAX_LISTED_CHANNELS: usize = 32;

const TOGGLE: &str = "toggle";
const SPEED: &str = "speed";
const MIN: &str = "min";
const MAX: &str = "max";
const CHANNELS: &str = "channels";

/// Effect-specific part of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectCommand {
    Toggle,
    /// Step interval in milliseconds; for breath, percent of a radian per step
    Speed(u32),
    /// Lower breath bound
    Min(u8),
    /// Upper breath bound
    Max(u8),
    /// Breath member channels, 1-based
    Channels(Vec<u16, MAX_LISTED_CHANNELS>),
}

/// A validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Flip the indicator and broadcast it
    Toggle,
    /// Direct write of a 1-based channel; the value is clamped when written
    SetChannel { channel: u16, value: i32 },
    Effect(EffectId, EffectCommand),
}

/// Reasons a command string is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    InvalidNumber,
    OutOfRange,
    TooManyChannels,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::Empty => "empty command",
            Self::UnknownCommand => "unknown command",
            Self::InvalidNumber => "invalid number",
            Self::OutOfRange => "value out of range",
            Self::TooManyChannels => "too many channels listed",
        };
        f.write_str(message)
    }
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty);
        }
        if input == TOGGLE {
            return Ok(Self::Toggle);
        }

        let (head, rest) = input.split_once(':').ok_or(ParseError::UnknownCommand)?;
        if let Some(id) = EffectId::parse_from_str(head) {
            return parse_effect(id, rest).map(|command| Self::Effect(id, command));
        }

        let channel = parse_number::<u16>(head)?;
        let value = parse_number::<i32>(rest)?;
        Ok(Self::SetChannel { channel, value })
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_effect(id: EffectId, input: &str) -> Result<EffectCommand, ParseError> {
    if input == TOGGLE {
        return Ok(EffectCommand::Toggle);
    }

    let (key, value) = input.split_once(':').ok_or(ParseError::UnknownCommand)?;
    match (id, key) {
        (_, SPEED) => {
            let speed = parse_number::<u32>(value)?;
            // A zero step interval would fire on every frame check; refuse it
            if speed == 0 && id != EffectId::Breath {
                return Err(ParseError::OutOfRange);
            }
            Ok(EffectCommand::Speed(speed))
        }
        (EffectId::Breath, MIN) => parse_number::<u8>(value).map(EffectCommand::Min),
        (EffectId::Breath, MAX) => parse_number::<u8>(value).map(EffectCommand::Max),
        (EffectId::Breath, CHANNELS) => parse_channel_list(value).map(EffectCommand::Channels),
        _ => Err(ParseError::UnknownCommand),
    }
}

fn parse_channel_list(input: &str) -> Result<Vec<u16, MAX_LISTED_CHANNELS>, ParseError> {
    let mut channels = Vec::new();
    for entry in input.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let channel = parse_number::<u16>(entry)?;
        channels
            .push(channel)
            .map_err(|_| ParseError::TooManyChannels)?;
    }
    Ok(channels)
}

fn parse_number<T: FromStr<Err = core::num::ParseIntError>>(input: &str) -> Result<T, ParseError> {
    input.parse::<T>().map_err(|error| match error.kind() {
        core::num::IntErrorKind::PosOverflow | core::num::IntErrorKind::NegOverflow => {
            ParseError::OutOfRange
        }
        _ => ParseError::InvalidNumber,
    })
}
