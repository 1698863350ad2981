//! Ties MIDI decoding, the channel buffer and the frame transmitter together.

use crate::{
    channel_buffer::{ChannelBuffer, DEFAULT_CHANNEL_CAPACITY, OutOfRange},
    configuration::VelocityCurve,
    dmx::{SerialLine, Transmitter},
    midi::{ChannelWrite, decode},
};
use core::convert::Infallible;
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use wmidi::MidiMessage;

/// What [`Bridge::handle`] did with a message.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    /// The message updated a channel and a full frame was transmitted.
    Transmitted(ChannelWrite),
    /// The message has no meaning for the bridge; nothing was changed or sent.
    Ignored,
}

/// The device's state for its whole lifetime: the intensity of every channel touched so far, and exclusive ownership of
/// the transmitter that puts them on the bus.
pub struct Bridge<L, D, B, const N: usize = DEFAULT_CHANNEL_CAPACITY> {
    channels: ChannelBuffer<N>,
    transmitter: Transmitter<L, D, B>,
    velocity_curve: VelocityCurve,
}

impl<L: SerialLine, D: DelayNs, B: OutputPin<Error = Infallible>, const N: usize> Bridge<L, D, B, N> {
    /// Constructs a [`Bridge`] with every channel dark.
    pub fn new(transmitter: Transmitter<L, D, B>, velocity_curve: VelocityCurve) -> Self {
        Self {
            channels: ChannelBuffer::new(),
            transmitter,
            velocity_curve,
        }
    }

    /// Getter.
    pub fn channels(&self) -> &ChannelBuffer<N> {
        &self.channels
    }

    /// Getter.
    pub fn velocity_curve(&self) -> VelocityCurve {
        self.velocity_curve
    }

    /// Setter. Takes effect from the next Note On; intensities already stored are left alone.
    pub fn set_velocity_curve(&mut self, velocity_curve: VelocityCurve) {
        self.velocity_curve = velocity_curve;
    }

    /// Applies `msg` to the channel buffer and, if anything changed, transmits a frame covering every channel up to the
    /// highest one touched so far (not just the channel that changed).
    ///
    /// Blocks for as long as the frame takes to send. Notes beyond the capacity of the buffer are rejected without
    /// transmitting.
    pub fn handle(&mut self, msg: &MidiMessage) -> Result<Handled, OutOfRange> {
        let Some(write) = decode(msg, self.velocity_curve) else {
            #[cfg(feature = "defmt")]
            {
                let mut data = [0_u8; 3];
                let _ = msg.copy_to_slice(&mut data);
                defmt::info!("Received unsupported MIDI message: {}", data);
            }
            return Ok(Handled::Ignored);
        };

        #[cfg(feature = "defmt")]
        {
            match msg {
                MidiMessage::NoteOn(channel, note, velocity) => defmt::info!(
                    "Received NoteOn: channel {}, note {}, velocity: {}",
                    channel.number(),
                    note.to_str(),
                    u8::from(*velocity)
                ),
                MidiMessage::NoteOff(channel, note, _) => defmt::info!(
                    "Received NoteOff: channel {}, note {}",
                    channel.number(),
                    note.to_str()
                ),
                _ => {}
            }
        }

        if let Err(err) = self.channels.set_channel(write.channel, write.value) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Note {} is beyond the last of {} channels; ignoring",
                err.index,
                err.capacity
            );
            return Err(err);
        }

        self.transmitter.transmit(self.channels.as_slice());
        Ok(Handled::Transmitted(write))
    }
}
