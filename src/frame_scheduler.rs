//! Frame scheduling and timing utilities.
//!
//! Provides fixed-period frame pacing without async/await or platform-specific
//! timers. The caller polls [`FrameScheduler::tick`] from its loop and is
//! responsible for sleeping/waiting between calls.

use embassy_time::{Duration, Instant};

use crate::FrameOutput;
use crate::command_processor::CommandProcessor;
use crate::config::DMX_INTERVAL;
use crate::controller::Controller;

/// Result of a scheduler poll.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// Whether a frame was computed and sent during this poll.
    pub sent: bool,
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long the caller may wait until the next frame (zero when behind).
    pub sleep_duration: Duration,
}

/// Portable DMX frame scheduler.
///
/// On every poll it services pending commands. Once per frame period it
/// advances the effects, snapshots the channel store and hands the frame to
/// the output.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(controller, transmitter, commands);
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     // Service other work, or sleep for `result.sleep_duration`
/// }
/// ```
pub struct FrameScheduler<'a, O: FrameOutput, const N: usize, const SIZE: usize, const OUT: usize> {
    output: O,
    controller: Controller<N>,
    commands: CommandProcessor<'a, N, SIZE, OUT>,
    next_frame: Instant,
    frame_duration: Duration,
}

impl<'a, O: FrameOutput, const N: usize, const SIZE: usize, const OUT: usize>
    FrameScheduler<'a, O, N, SIZE, OUT>
{
    /// Create a new frame scheduler.
    ///
    /// Uses [`DMX_INTERVAL`] (30 ms) as the frame period.
    pub fn new(
        controller: Controller<N>,
        output: O,
        commands: CommandProcessor<'a, N, SIZE, OUT>,
    ) -> Self {
        Self::with_frame_duration(controller, output, commands, DMX_INTERVAL)
    }

    /// Create a new frame scheduler with custom frame period.
    pub fn with_frame_duration(
        controller: Controller<N>,
        output: O,
        commands: CommandProcessor<'a, N, SIZE, OUT>,
        frame_duration: Duration,
    ) -> Self {
        Self {
            output,
            controller,
            commands,
            next_frame: Instant::from_millis(0),
            frame_duration,
        }
    }

    /// Poll the scheduler.
    ///
    /// This method:
    /// 1. Applies pending commands, on every call
    /// 2. Returns early when the next frame is not due yet
    /// 3. Updates effects, builds the frame and sends it
    /// 4. Publishes a channel snapshot when a client is listening
    /// 5. Schedules the next frame one period after `now`
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        self.commands.process_pending(&mut self.controller, now);

        if now < self.next_frame {
            return FrameResult {
                sent: false,
                next_deadline: self.next_frame,
                sleep_duration: self.next_frame.saturating_duration_since(now),
            };
        }

        let frame = self.controller.update(now);
        self.output.send(&frame);

        if let Some(snapshot) = self.controller.take_snapshot() {
            self.commands.publish(snapshot);
        }

        // Measured from this frame, so a late tick never shortens the next gap
        self.next_frame = now + self.frame_duration;

        FrameResult {
            sent: true,
            next_deadline: self.next_frame,
            sleep_duration: self.next_frame.saturating_duration_since(now),
        }
    }

    /// Frame period
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// The controller driven by this scheduler
    pub const fn controller(&self) -> &Controller<N> {
        &self.controller
    }

    /// The controller, mutably
    pub fn controller_mut(&mut self) -> &mut Controller<N> {
        &mut self.controller
    }

    /// The frame sink
    pub const fn output(&self) -> &O {
        &self.output
    }

    /// The frame sink, mutably
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
