//! DMX512 wire constants and the frame type.
//!
//! A frame is the start code followed by the channel slots, exactly as it
//! goes out on the line after BREAK and MARK-AFTER-BREAK.

use heapless::Vec;

/// Start code for standard dimmer data
pub const START_CODE: u8 = 0x00;

/// DMX line rate in bits per second
pub const DMX_BAUD: u32 = 250_000;

/// Channel slots in a full universe
pub const UNIVERSE_SIZE: usize = 512;

/// Start code + full universe
pub const MAX_FRAME_LEN: usize = UNIVERSE_SIZE + 1;

/// Shortest BREAK accepted by receivers is 88 us, we keep some margin
pub const BREAK_MIN_US: u32 = 92;

/// Shortest MARK-AFTER-BREAK
pub const MAB_MIN_US: u32 = 8;

/// Time on the wire of one 8N2 slot (11 bits at 250 kbit/s)
pub const BYTE_TIME_US: u64 = 44;

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Asynchronous serial framing used to (re)attach the UART
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialFormat {
    pub baud: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
}

/// 250 kbit/s, 8 data bits, 2 stop bits, no parity
pub const DMX_SERIAL_FORMAT: SerialFormat = SerialFormat {
    baud: DMX_BAUD,
    data_bits: 8,
    stop_bits: 2,
    parity: Parity::None,
};

/// One DMX packet: start code followed by channel values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmxFrame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl DmxFrame {
    /// Build a frame with the standard start code
    ///
    /// Channels past the universe size are not representable and are cut off.
    pub fn from_channels(channels: &[u8]) -> Self {
        Self::with_start_code(START_CODE, channels)
    }

    /// Build a frame with an alternate start code
    pub fn with_start_code(start_code: u8, channels: &[u8]) -> Self {
        let count = channels.len().min(UNIVERSE_SIZE);
        let mut bytes = Vec::new();
        // Capacity is MAX_FRAME_LEN and count is bounded by UNIVERSE_SIZE
        let _ = bytes.push(start_code);
        let _ = bytes.extend_from_slice(&channels[..count]);
        Self { bytes }
    }

    /// Slot 0 of the frame
    pub fn start_code(&self) -> u8 {
        self.bytes.first().copied().unwrap_or(START_CODE)
    }

    /// Channel slots without the start code
    pub fn channels(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or(&[])
    }

    /// Bytes exactly as written to the line
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
