//! Provides a struct [`ChannelBuffer`] for holding the latest known intensity of every DMX channel addressed since
//! boot. The buffer only ever grows "upward": once a channel has been written, it and every channel beneath it are
//! part of each transmitted frame for the rest of the device's life.

/// The number of channels the device addresses unless configured otherwise. MIDI notes run from 0 to 127, so this
/// covers every note without wasting slots.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// The DMX512 standard allows at most this many channels (a.k.a. slots) per universe.
pub const DMX_MAX_CHANNELS: usize = 512;

/// Returned when a write targets a channel beyond the capacity of a [`ChannelBuffer`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    /// The rejected channel index.
    pub index: usize,
    /// The capacity of the buffer which rejected it.
    pub capacity: usize,
}

/// A fixed-capacity array of per-channel intensities plus the index of the highest channel ever written.
///
/// Channels are never "freed." Lowering a channel's intensity to zero leaves it in the frame, so the frame always covers
/// a contiguous prefix of the buffer rather than a sparse set of channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelBuffer<const N: usize = DEFAULT_CHANNEL_CAPACITY> {
    values: [u8; N],
    /// 0-based index of the greatest channel written since construction
    highest_active: usize,
}

impl Default for ChannelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for ChannelBuffer<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ChannelBuffer {{ highest_active: {}, values: {} }}",
            self.highest_active,
            self.as_slice()
        );
    }
}

impl<const N: usize> ChannelBuffer<N> {
    /// Construct a zeroed `ChannelBuffer`.
    pub const fn new() -> Self {
        const {
            assert!(
                N > 0 && N <= DMX_MAX_CHANNELS,
                "capacity must be between 1 and 512 channels"
            )
        };
        Self {
            values: [0; N],
            highest_active: 0,
        }
    }

    /// Store `value` as the intensity of the channel at `index`, raising the highest active channel if needed.
    ///
    /// Writes past the capacity of the buffer are rejected and leave it untouched.
    pub fn set_channel(&mut self, index: usize, value: u8) -> Result<(), OutOfRange> {
        let slot = self.values.get_mut(index).ok_or(OutOfRange { index, capacity: N })?;
        *slot = value;
        self.highest_active = self.highest_active.max(index);
        Ok(())
    }

    /// Returns the intensity stored for the channel at `index`, if it exists.
    pub fn channel(&self, index: usize) -> Option<u8> {
        self.values.get(index).copied()
    }

    /// Index of the greatest channel written so far.
    pub fn highest_active(&self) -> usize {
        self.highest_active
    }

    /// The number of channels to include in the next transmitted frame.
    pub fn snapshot_len(&self) -> usize {
        self.highest_active + 1
    }

    /// Read-only view of the channels covered by the next transmitted frame, lowest channel first.
    pub fn as_slice(&self) -> &[u8] {
        &self.values[..self.snapshot_len()]
    }

    /// The fixed number of channels this buffer can address.
    pub const fn capacity(&self) -> usize {
        N
    }
}
