//! DMX512 frame receiver
//!
//! A plain UART cannot report a BREAK, so frame boundaries are recovered from
//! timing: a silence longer than any inter-slot gap means a BREAK just ended
//! and the next byte is a start code.
//!
//! Bytes must be timestamped where they arrive (UART interrupt), not where
//! they are processed. At 250 kbit/s a slot takes 44 us, so a loop that
//! drains the UART less often than that has to buffer; the [`RxQueue`]
//! carries the arrival time with every byte and [`rx_queue_capacity`] sizes
//! it for a given loop period.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::OutputPin;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::channel::{Channel, Receiver, Sender};
use crate::config::{RX_BREAK_GAP, RX_REPORT_INTERVAL, RX_START_CHANNEL};
use crate::frame::{BYTE_TIME_US, MAX_FRAME_LEN, UNIVERSE_SIZE};
use crate::timer::IntervalTimer;

/// Channels forwarded per frame
pub const FORWARD_CHANNELS: usize = 4;

/// A received byte and the time it came off the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxByte {
    pub value: u8,
    pub at: Instant,
}

/// Type alias for the UART byte FIFO
pub type RxQueue<const SIZE: usize> = Channel<RxByte, SIZE>;

/// Type alias for the interrupt side of the byte FIFO
pub type RxSender<'a, const SIZE: usize> = Sender<'a, RxByte, SIZE>;

/// Type alias for the loop side of the byte FIFO
pub type RxReceiver<'a, const SIZE: usize> = Receiver<'a, RxByte, SIZE>;

/// Queue depth needed when the loop visits the UART every `loop_period`
///
/// One slot per byte time in a period, plus one for the byte in flight.
pub const fn rx_queue_capacity(loop_period: Duration) -> usize {
    let slots = loop_period.as_micros().div_ceil(BYTE_TIME_US) + 1;
    #[allow(clippy::cast_possible_truncation)]
    {
        slots as usize
    }
}

/// Reassembles frames from a byte stream using inter-byte gaps
#[derive(Debug, Clone)]
pub struct FrameSynchronizer {
    data: [u8; MAX_FRAME_LEN],
    cursor: usize,
    receiving: bool,
    ready: bool,
    last_byte: Option<Instant>,
    break_gap: Duration,
    frames: u32,
    dropped: u32,
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new(RX_BREAK_GAP)
    }
}

impl FrameSynchronizer {
    /// Create a synchronizer treating silences of `break_gap` or more as BREAK
    pub const fn new(break_gap: Duration) -> Self {
        Self {
            data: [0; MAX_FRAME_LEN],
            cursor: 0,
            receiving: false,
            ready: false,
            last_byte: None,
            break_gap,
            frames: 0,
            dropped: 0,
        }
    }

    /// Feed one byte received at `at`
    ///
    /// A silence of at least `break_gap` before the byte marks a BREAK; with
    /// the default gap, exactly 120 us already resynchronises. The first byte
    /// ever seen counts as following a BREAK.
    pub fn push(&mut self, value: u8, at: Instant) {
        let after_break = self
            .last_byte
            .is_none_or(|last| at.saturating_duration_since(last) >= self.break_gap);
        self.last_byte = Some(at);

        if after_break {
            if self.receiving && self.cursor > 0 {
                // Cut short by the next BREAK
                self.dropped = self.dropped.saturating_add(1);
            }
            self.cursor = 0;
            self.receiving = true;
        }

        if !self.receiving {
            return;
        }

        self.data[self.cursor] = value;
        self.cursor += 1;

        if self.cursor > UNIVERSE_SIZE {
            self.receiving = false;
            self.ready = true;
            self.frames = self.frames.saturating_add(1);
        }
    }

    /// Whether a completed frame is waiting
    pub const fn is_frame_ready(&self) -> bool {
        self.ready
    }

    /// Whether a frame is being reassembled
    pub const fn is_receiving(&self) -> bool {
        self.receiving
    }

    /// Completed frame, returned once per frame
    ///
    /// Slot 0 is the sender's start code, channel `n` is at index `n`.
    pub fn take_frame(&mut self) -> Option<&[u8; MAX_FRAME_LEN]> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(&self.data)
    }

    /// Last reassembled data, complete or not
    pub const fn data(&self) -> &[u8; MAX_FRAME_LEN] {
        &self.data
    }

    /// Frames completed so far
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Partial frames abandoned on resynchronisation
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// First four forwarded channels of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForwardPacket {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl ForwardPacket {
    /// Read the packet starting at 1-based `start_channel`
    pub fn from_frame(frame: &[u8; MAX_FRAME_LEN], start_channel: u16) -> Option<Self> {
        let start = usize::from(start_channel);
        if start == 0 {
            return None;
        }
        let &[red, green, blue, white] = frame.get(start..start + FORWARD_CHANNELS)? else {
            return None;
        };
        Some(Self {
            red,
            green,
            blue,
            white,
        })
    }

    /// Forwarded channels in wire order
    pub const fn as_array(&self) -> [u8; FORWARD_CHANNELS] {
        [self.red, self.green, self.blue, self.white]
    }
}

/// Configuration of the receive side
#[derive(Debug, Clone, Copy)]
pub struct ReceiverConfig {
    pub break_gap: Duration,
    /// First forwarded channel, 1-based
    pub start_channel: u16,
    pub report_interval: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            break_gap: RX_BREAK_GAP,
            start_channel: RX_START_CHANNEL,
            report_interval: RX_REPORT_INTERVAL,
        }
    }
}

/// Receive pipeline: transceiver in listen mode, byte FIFO, synchroniser
pub struct DmxReceiver<'a, DE, RE, const SIZE: usize> {
    bytes: RxReceiver<'a, SIZE>,
    sync: FrameSynchronizer,
    start_channel: u16,
    report: IntervalTimer,
    latest: Option<ForwardPacket>,
    driver_enable: DE,
    receiver_enable: RE,
}

impl<'a, DE, RE, const SIZE: usize> DmxReceiver<'a, DE, RE, SIZE>
where
    DE: OutputPin,
    RE: OutputPin,
{
    /// Create a receiver and switch the transceiver to listening
    pub fn new(
        bytes: RxReceiver<'a, SIZE>,
        driver_enable: DE,
        receiver_enable: RE,
        config: &ReceiverConfig,
    ) -> Self {
        let mut receiver = Self {
            bytes,
            sync: FrameSynchronizer::new(config.break_gap),
            start_channel: config.start_channel,
            report: IntervalTimer::new(config.report_interval),
            latest: None,
            driver_enable,
            receiver_enable,
        };
        receiver.listen();
        receiver
    }

    /// Driver off, receiver on
    pub fn listen(&mut self) {
        let driver = self.driver_enable.set_low();
        let receiver = self.receiver_enable.set_low();
        if driver.is_err() || receiver.is_err() {
            #[cfg(feature = "esp32-log")]
            println!("[DmxReceiver.listen] transceiver control failed");
        }
    }

    /// Drain buffered bytes
    ///
    /// Returns the packet of the most recent frame completed during this
    /// call, if any.
    pub fn poll(&mut self, now: Instant) -> Option<ForwardPacket> {
        let mut packet = None;
        while let Ok(byte) = self.bytes.try_receive() {
            self.sync.push(byte.value, byte.at);
            if let Some(frame) = self.sync.take_frame() {
                packet = ForwardPacket::from_frame(frame, self.start_channel).or(packet);
            }
        }
        if packet.is_some() {
            self.latest = packet;
        }

        if self.report.poll(now) {
            self.report();
        }

        packet
    }

    /// Packet of the last completed frame
    pub const fn latest(&self) -> Option<ForwardPacket> {
        self.latest
    }

    /// The frame synchronizer
    pub const fn synchronizer(&self) -> &FrameSynchronizer {
        &self.sync
    }

    /// Change the first forwarded channel, 1-based
    pub fn set_start_channel(&mut self, start_channel: u16) {
        self.start_channel = start_channel;
    }

    /// Bytes lost because the FIFO overflowed
    pub fn overruns(&self) -> u32 {
        self.bytes.dropped()
    }

    fn report(&self) {
        #[cfg(feature = "esp32-log")]
        if let Some(packet) = self.latest {
            println!(
                "[DmxReceiver] frames={} dropped={} overruns={} data={:?}",
                self.sync.frames(),
                self.sync.dropped(),
                self.overruns(),
                packet.as_array()
            );
        }
    }
}
