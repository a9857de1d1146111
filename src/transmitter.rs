//! DMX512 frame transmitter
//!
//! Drives an RS-485 transceiver: BREAK and MARK-AFTER-BREAK are produced by
//! taking the TX pin away from the UART and toggling it by hand, then the UART
//! is reattached at 250 kbit/s 8N2 and the frame is written out.
//!
//! The BREAK/MAB holds are blocking delays; the MAB must not be stretched by
//! a yield.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::Write;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::FrameOutput;
use crate::config::{DEFAULT_BREAK_US, DEFAULT_MAB_US};
use crate::frame::{BREAK_MIN_US, DMX_SERIAL_FORMAT, DmxFrame, MAB_MIN_US, SerialFormat};

/// Serial line that can be switched between UART framing and manual level
/// control
///
/// `embedded_io::Write` carries the frame bytes while the UART is attached.
pub trait DmxLine: Write {
    /// Release the TX pin from the UART so it can be driven directly
    fn detach(&mut self);

    /// Drive the detached TX pin
    fn set_level(&mut self, high: bool);

    /// Give the TX pin back to the UART with the given framing
    fn attach(&mut self, format: &SerialFormat);
}

/// BREAK and MARK-AFTER-BREAK lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitTimings {
    break_us: u32,
    mab_us: u32,
}

impl TransmitTimings {
    /// Values below the protocol minimum are raised to it
    pub const fn new(break_us: u32, mab_us: u32) -> Self {
        Self {
            break_us: if break_us < BREAK_MIN_US { BREAK_MIN_US } else { break_us },
            mab_us: if mab_us < MAB_MIN_US { MAB_MIN_US } else { mab_us },
        }
    }

    /// BREAK length in microseconds
    pub const fn break_us(&self) -> u32 {
        self.break_us
    }

    /// MARK-AFTER-BREAK length in microseconds
    pub const fn mab_us(&self) -> u32 {
        self.mab_us
    }
}

impl Default for TransmitTimings {
    fn default() -> Self {
        Self::new(DEFAULT_BREAK_US, DEFAULT_MAB_US)
    }
}

/// DMX transmitter over a half-duplex transceiver
///
/// `DE` enables the line driver (active high), `RE` is the receiver enable
/// line, driven high to keep our own receiver off while transmitting.
pub struct DmxTransmitter<L, DE, RE, D> {
    line: L,
    driver_enable: DE,
    receiver_enable: RE,
    delay: D,
    timings: TransmitTimings,
}

impl<L, DE, RE, D> DmxTransmitter<L, DE, RE, D>
where
    L: DmxLine,
    DE: OutputPin,
    RE: OutputPin,
    D: DelayNs,
{
    /// Create a transmitter and leave the bus idle
    pub fn new(
        line: L,
        driver_enable: DE,
        receiver_enable: RE,
        delay: D,
        timings: TransmitTimings,
    ) -> Self {
        let mut transmitter = Self {
            line,
            driver_enable,
            receiver_enable,
            delay,
            timings,
        };
        transmitter.line.attach(&DMX_SERIAL_FORMAT);
        transmitter.release_bus();
        transmitter
    }

    /// BREAK and MAB lengths in use
    pub const fn timings(&self) -> TransmitTimings {
        self.timings
    }

    /// Send one frame and return once it is flushed to the wire
    ///
    /// Peripheral errors are not recoverable here; the frame is abandoned and
    /// the next tick sends a fresh one.
    pub fn transmit(&mut self, frame: &DmxFrame) {
        self.claim_bus();

        // BREAK
        self.line.detach();
        self.line.set_level(false);
        self.delay.delay_us(self.timings.break_us);

        // MARK-AFTER-BREAK
        self.line.set_level(true);
        self.delay.delay_us(self.timings.mab_us);

        self.line.attach(&DMX_SERIAL_FORMAT);
        if let Err(_error) = self.line.write_all(frame.as_bytes()) {
            #[cfg(feature = "esp32-log")]
            println!("[DmxTransmitter.transmit] write failed: {:?}", _error);
        }
        if let Err(_error) = self.line.flush() {
            #[cfg(feature = "esp32-log")]
            println!("[DmxTransmitter.transmit] flush failed: {:?}", _error);
        }

        self.release_bus();
    }

    /// Give back the hardware
    pub fn release(self) -> (L, DE, RE, D) {
        (self.line, self.driver_enable, self.receiver_enable, self.delay)
    }

    fn claim_bus(&mut self) {
        let receiver = self.receiver_enable.set_high();
        let driver = self.driver_enable.set_high();
        if receiver.is_err() || driver.is_err() {
            #[cfg(feature = "esp32-log")]
            println!("[DmxTransmitter.claim_bus] transceiver control failed");
        }
    }

    fn release_bus(&mut self) {
        let driver = self.driver_enable.set_low();
        let receiver = self.receiver_enable.set_low();
        if receiver.is_err() || driver.is_err() {
            #[cfg(feature = "esp32-log")]
            println!("[DmxTransmitter.release_bus] transceiver control failed");
        }
    }
}

impl<L, DE, RE, D> FrameOutput for DmxTransmitter<L, DE, RE, D>
where
    L: DmxLine,
    DE: OutputPin,
    RE: OutputPin,
    D: DelayNs,
{
    fn send(&mut self, frame: &DmxFrame) {
        self.transmit(frame);
    }
}
