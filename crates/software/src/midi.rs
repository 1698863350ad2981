//! Translates MIDI messages into writes against the [`ChannelBuffer`][crate::channel_buffer::ChannelBuffer].
//!
//! Only Note On and Note Off mean anything to the bridge. The note number addresses the channel directly (note 0 is the
//! first DMX channel) and the velocity sets its intensity.

use crate::configuration::VelocityCurve;
use core::slice::Chunks;
use wmidi::MidiMessage;

/// A single channel update derived from a MIDI message.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelWrite {
    /// 0-based DMX channel index.
    pub channel: usize,
    /// Intensity to store.
    pub value: u8,
}

/// Returns the channel update `msg` calls for, or `None` for messages the bridge ignores.
///
/// Note Off always extinguishes the channel, whatever its release velocity. MIDI channels are not distinguished.
pub fn decode(msg: &MidiMessage, curve: VelocityCurve) -> Option<ChannelWrite> {
    match msg {
        MidiMessage::NoteOn(_, note, velocity) => Some(ChannelWrite {
            channel: usize::from(u8::from(*note)),
            value: curve.intensity(*velocity),
        }),
        MidiMessage::NoteOff(_, note, _) => Some(ChannelWrite {
            channel: usize::from(u8::from(*note)),
            value: 0,
        }),
        _ => None,
    }
}

/// Iterator over the MIDI messages carried by a buffer of USB-MIDI Event Packets.
///
/// Each packet is 32 bits long. The first byte, the packet header (cable number and code index), is not of interest; the
/// remaining three contain the MIDI message. Trailing bytes that don't make up a whole packet are dropped, as are packets
/// whose contents don't parse (e.g., zero padding).
pub struct UsbMidiPackets<'a> {
    chunks: Chunks<'a, u8>,
}

impl<'a> UsbMidiPackets<'a> {
    /// Length in bytes of one USB-MIDI Event Packet.
    pub const PACKET_LEN: usize = 4;

    /// Constructs a [`UsbMidiPackets`] over `data` as read from a USB MIDI streaming endpoint.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            chunks: data.chunks(Self::PACKET_LEN),
        }
    }
}

impl<'a> Iterator for UsbMidiPackets<'a> {
    type Item = MidiMessage<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for potential_packet in self.chunks.by_ref() {
            if potential_packet.len() != Self::PACKET_LEN {
                #[cfg(feature = "defmt")]
                defmt::error!("USB-MIDI Event Packets must always be 32 bits long");
                continue;
            }
            if let Ok(msg) = MidiMessage::from_bytes(&potential_packet[1..]) {
                return Some(msg);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;
    use wmidi::{Channel, ControlFunction, Note, U7};

    fn note(n: u8) -> Note {
        Note::from(U7::from_u8_lossy(n))
    }

    #[test]
    fn note_on() {
        let msg = MidiMessage::NoteOn(Channel::Ch1, note(10), U7::from_u8_lossy(127));
        assert_eq!(
            Some(ChannelWrite {
                channel: 10,
                value: 255
            }),
            decode(&msg, VelocityCurve::Full),
            "Expected left but got right"
        );
    }

    #[test]
    fn note_on_honors_curve() {
        let msg = MidiMessage::NoteOn(Channel::Ch3, note(2), U7::from_u8_lossy(127));
        assert_eq!(
            Some(ChannelWrite {
                channel: 2,
                value: 254
            }),
            decode(&msg, VelocityCurve::Doubled),
            "Expected left but got right"
        );
    }

    #[test]
    fn note_off_ignores_release_velocity() {
        let msg = MidiMessage::NoteOff(Channel::Ch1, note(5), U7::from_u8_lossy(100));
        assert_eq!(
            Some(ChannelWrite {
                channel: 5,
                value: 0
            }),
            decode(&msg, VelocityCurve::Full),
            "Expected left but got right"
        );
    }

    #[test]
    fn control_change_is_ignored() {
        let msg = MidiMessage::ControlChange(
            Channel::Ch1,
            ControlFunction::PORTAMENTO_TIME,
            U7::from_u8_lossy(64),
        );
        assert_eq!(None, decode(&msg, VelocityCurve::Full), "Expected left but got right");
    }

    #[test]
    fn packets_yield_messages_in_order() {
        let data = [
            0x09, 0x90, 60, 100, // Note On
            0x08, 0x80, 60, 0, // Note Off
            0x0B, 0xB0, 5, 64, // Control Change
        ];
        let messages: Vec<MidiMessage> = UsbMidiPackets::new(&data).collect();
        assert_eq!(
            std::vec![
                MidiMessage::NoteOn(Channel::Ch1, note(60), U7::from_u8_lossy(100)),
                MidiMessage::NoteOff(Channel::Ch1, note(60), U7::from_u8_lossy(0)),
                MidiMessage::ControlChange(
                    Channel::Ch1,
                    ControlFunction::PORTAMENTO_TIME,
                    U7::from_u8_lossy(64)
                ),
            ],
            messages,
            "Expected left but got right"
        );
    }

    #[test]
    fn packets_skip_padding_and_partial_packets() {
        let data = [
            0x00, 0x00, 0x00, 0x00, // padding
            0x09, 0x91, 1, 1, // Note On, channel 2
            0x09, 0x90, // truncated
        ];
        let messages: Vec<MidiMessage> = UsbMidiPackets::new(&data).collect();
        assert_eq!(
            std::vec![MidiMessage::NoteOn(
                Channel::Ch2,
                note(1),
                U7::from_u8_lossy(1)
            )],
            messages,
            "Expected left but got right"
        );
    }
}
