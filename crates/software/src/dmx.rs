//! Composes and transmits DMX512 frames.
//!
//! A frame begins with a preamble that UART hardware cannot produce on its own: a long "break" (line low) followed by a
//! "mark-after-break" (line high). Only then does the UART take over, sending the start code and one byte per channel.
//! See [`Transmitter::transmit`] for the exact sequence.

use crate::channel_buffer::DMX_MAX_CHANNELS;
use core::{convert::Infallible, iter};
use embedded_hal::{delay::DelayNs, digital::OutputPin};

mod serial_line;
pub use serial_line::*;

mod timing;
pub use timing::*;

/// DMX512 line rate in bits per second.
pub const DMX_BAUD: u32 = 250_000;

/// The "null" start code, identifying a frame of standard dimmer data.
pub const START_CODE: u8 = 0x00;

/// Returns the bytes of the frame carrying `channels`: the start code followed by one byte per channel, lowest channel first.
///
/// The break and mark-after-break are not bytes and so are not part of the returned sequence.
pub fn frame(channels: &[u8]) -> impl Iterator<Item = u8> + '_ {
    iter::once(START_CODE).chain(channels.iter().copied())
}

/// Drives a [`SerialLine`] to emit complete DMX512 frames, lighting a busy indicator for the duration of each.
///
/// Owns the line exclusively; between frames the UART transmitter is disabled and the line idles at [`LineLevel::High`].
pub struct Transmitter<L, D, B> {
    line: L,
    delay: D,
    busy: B,
    timing: FrameTiming,
}

impl<L: SerialLine, D: DelayNs, B: OutputPin<Error = Infallible>> Transmitter<L, D, B> {
    /// Constructs a [`Transmitter`], putting the line and the busy indicator in their idle states.
    pub fn new(mut line: L, delay: D, mut busy: B, timing: FrameTiming) -> Self {
        line.disable_transmitter();
        line.set_line_level(LineLevel::High);
        let Ok(()) = busy.set_low();

        Self {
            line,
            delay,
            busy,
            timing,
        }
    }

    /// Transmits one frame carrying `channels`, lowest channel first.
    ///
    /// This call blocks until the last stop bit of the last channel has left the UART. At 250,000 bit/s each slot takes
    /// 44 µs, so a full 512-channel frame holds the caller for roughly 23 ms.
    pub fn transmit(&mut self, channels: &[u8]) {
        debug_assert!(channels.len() <= DMX_MAX_CHANNELS);

        let Ok(()) = self.busy.set_high();

        // the transmitter was disabled at the end of the previous frame, so the line is ours to drive
        self.line.set_line_level(LineLevel::Low);
        self.delay.delay_us(self.timing.break_micros());
        self.line.set_line_level(LineLevel::High);
        self.delay.delay_us(self.timing.mark_after_break_micros());

        self.line.enable_transmitter();
        for byte in frame(channels) {
            self.line.send_byte(byte);
        }
        self.line.disable_transmitter();

        let Ok(()) = self.busy.set_low();
    }
}
