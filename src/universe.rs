use crate::frame::DmxFrame;

/// Channel store: the values sent on every frame
///
/// Index 0 holds DMX channel 1. Values are raw 0-255 intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe<const N: usize> {
    channels: [u8; N],
}

impl<const N: usize> Default for Universe<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Universe<N> {
    /// Create a store with every channel at zero
    pub const fn new() -> Self {
        Self { channels: [0; N] }
    }

    /// Number of channels
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Write a 1-based channel, clamping the value into 0-255
    ///
    /// Returns `false` and leaves the store untouched when the channel is
    /// outside `1..=N`.
    pub fn set(&mut self, channel: u16, value: i32) -> bool {
        let Some(index) = Self::index_of(channel) else {
            return false;
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = value.clamp(0, i32::from(u8::MAX)) as u8;
        self.channels[index] = value;
        true
    }

    /// Read a 1-based channel
    pub fn get(&self, channel: u16) -> Option<u8> {
        Self::index_of(channel).map(|index| self.channels[index])
    }

    /// Channel values, index 0 is channel 1
    pub fn as_slice(&self) -> &[u8] {
        &self.channels
    }

    /// Channel values for effects to write into
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.channels
    }

    /// Copy of the current values
    pub const fn snapshot(&self) -> [u8; N] {
        self.channels
    }

    /// Frame for the transmitter: start code, then every channel
    pub fn frame(&self) -> DmxFrame {
        DmxFrame::from_channels(&self.channels)
    }

    fn index_of(channel: u16) -> Option<usize> {
        let index = usize::from(channel).checked_sub(1)?;
        (index < N).then_some(index)
    }
}
