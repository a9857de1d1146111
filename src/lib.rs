#![no_std]

pub mod channel;
pub mod command;
pub mod command_processor;
pub mod config;
pub mod controller;
pub mod effect;
pub mod frame;
pub mod frame_scheduler;
pub mod receiver;
pub mod timer;
pub mod transmitter;
pub mod universe;

pub use command::{Command, EffectCommand, ParseError};
pub use command_processor::{
    BroadcastChannel, BroadcastSender, CommandChannel, CommandProcessor, CommandReceiver,
    CommandSender, SubmitError, submit,
};
pub use config::{ControllerConfig, EffectTimings};
pub use controller::{Broadcast, Controller, indicator_text, template_state};
pub use effect::{ConcurrencyPolicy, EffectEngine, EffectId, Lifecycle};
pub use frame::DmxFrame;
pub use frame_scheduler::{FrameResult, FrameScheduler};
pub use receiver::{
    DmxReceiver, ForwardPacket, FrameSynchronizer, ReceiverConfig, RxByte, RxQueue,
    rx_queue_capacity,
};
pub use transmitter::{DmxLine, DmxTransmitter, TransmitTimings};
pub use universe::Universe;

pub use embassy_time::{Duration, Instant};

/// Sink for finished DMX frames
///
/// Implement this trait to put frames on a wire (see [`DmxTransmitter`]) or
/// to capture them in tests. The scheduler is generic over it.
pub trait FrameOutput {
    /// Send one frame; returns once it has been handed off
    fn send(&mut self, frame: &DmxFrame);
}
