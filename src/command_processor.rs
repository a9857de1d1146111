//! Command intake and broadcast outlet
//!
//! The transport pushes validated commands into a bounded channel from its
//! own context; the main loop drains them between frames and hands any
//! resulting broadcasts to the outbound channel.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use embassy_time::Instant;

use crate::channel::{Channel, Receiver, Sender, TrySendError};
use crate::command::{Command, ParseError};
use crate::controller::{Broadcast, Controller};

/// Type alias for command sender
pub type CommandSender<'a, const SIZE: usize> = Sender<'a, Command, SIZE>;

/// Type alias for command receiver
pub type CommandReceiver<'a, const SIZE: usize> = Receiver<'a, Command, SIZE>;

/// Type alias for the command channel
pub type CommandChannel<const SIZE: usize> = Channel<Command, SIZE>;

/// Type alias for the outbound broadcast channel
pub type BroadcastChannel<const N: usize, const SIZE: usize> = Channel<Broadcast<N>, SIZE>;

/// Type alias for broadcast sender
pub type BroadcastSender<'a, const N: usize, const SIZE: usize> = Sender<'a, Broadcast<N>, SIZE>;

/// Reasons a text command did not reach the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Parse(ParseError),
    QueueFull(Command),
}

impl From<ParseError> for SubmitError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<TrySendError<Command>> for SubmitError {
    fn from(error: TrySendError<Command>) -> Self {
        Self::QueueFull(error.0)
    }
}

/// Validate a text command on the transport side and queue it
pub fn submit<const SIZE: usize>(
    sender: &CommandSender<'_, SIZE>,
    text: &str,
) -> Result<(), SubmitError> {
    let command = Command::parse(text)?;
    sender.try_send(command)?;
    Ok(())
}

/// Drains queued commands into a [`Controller`]
pub struct CommandProcessor<'a, const N: usize, const SIZE: usize, const OUT: usize> {
    commands: CommandReceiver<'a, SIZE>,
    broadcasts: Option<BroadcastSender<'a, N, OUT>>,
}

impl<'a, const N: usize, const SIZE: usize, const OUT: usize> CommandProcessor<'a, N, SIZE, OUT> {
    /// Create a processor draining `commands`; broadcasts are discarded
    pub const fn new(commands: CommandReceiver<'a, SIZE>) -> Self {
        Self {
            commands,
            broadcasts: None,
        }
    }

    /// Forward broadcasts into `broadcasts`; without it they are discarded
    #[must_use]
    pub fn with_broadcasts(mut self, broadcasts: BroadcastSender<'a, N, OUT>) -> Self {
        self.broadcasts = Some(broadcasts);
        self
    }

    /// Apply every pending command (non-blocking)
    ///
    /// Returns the number of commands applied.
    pub fn process_pending(&mut self, controller: &mut Controller<N>, now: Instant) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_receive() {
            if let Some(broadcast) = controller.apply(&command, now) {
                self.publish(broadcast);
            }
            applied += 1;
        }
        applied
    }

    /// Hand a payload to the outbound transport
    ///
    /// A full outbound queue drops the payload; the next change sends a
    /// fresh one.
    pub fn publish(&self, broadcast: Broadcast<N>) {
        let Some(broadcasts) = &self.broadcasts else {
            return;
        };
        if broadcasts.try_send(broadcast).is_err() {
            #[cfg(feature = "esp32-log")]
            println!("[CommandProcessor.publish] outbound queue full, dropping");
        }
    }
}
