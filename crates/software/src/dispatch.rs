//! The main dispatch loop: pump inbound MIDI into the [`Bridge`] and keep the transport serviced.

use crate::{
    bridge::{Bridge, Handled},
    dmx::SerialLine,
    midi::UsbMidiPackets,
};
use core::convert::Infallible;
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use wmidi::MidiMessage;

/// A source of inbound MIDI which is polled rather than awaited.
pub trait MidiTransport {
    /// Returns the next message that has already arrived, or `None` if there is nothing to process right now. Never blocks.
    fn poll_event(&mut self) -> Option<MidiMessage<'_>>;

    /// Services the transport's periodic housekeeping; called once per dispatch iteration whether or not any messages
    /// arrived.
    ///
    /// Transports whose housekeeping is driven elsewhere (e.g., by a dedicated USB task) can rely on the default, which
    /// does nothing.
    fn housekeeping(&mut self) {}
}

impl MidiTransport for UsbMidiPackets<'_> {
    fn poll_event(&mut self) -> Option<MidiMessage<'_>> {
        self.next()
    }
}

impl<L: SerialLine, D: DelayNs, B: OutputPin<Error = Infallible>, const N: usize> Bridge<L, D, B, N> {
    /// Runs one iteration of the dispatch loop: handles every message `transport` has available, then gives it one
    /// housekeeping tick. Returns the number of frames transmitted.
    ///
    /// Draining before housekeeping means every note of a chord lands before the transport is serviced. Blocks while
    /// frames are sent.
    pub fn service<T: MidiTransport>(&mut self, transport: &mut T) -> usize {
        let mut frames = 0;
        while let Some(msg) = transport.poll_event() {
            if let Ok(Handled::Transmitted(_)) = self.handle(&msg) {
                frames += 1;
            }
        }
        transport.housekeeping();
        frames
    }
}
