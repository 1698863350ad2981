//! This crate contains architecture-agnostic logic for a USB MIDI to [DMX512](https://en.wikipedia.org/wiki/DMX512) bridge,
//! a device which lets a keyboard, sequencer or DAW drive stage lighting. Each MIDI note addresses a DMX channel, and
//! the note's velocity sets the channel's intensity.
//!
//! Hardware is reached only through [`embedded_hal`] traits and the crate's own [`dmx::SerialLine`], so everything here
//! can be exercised on a host.

#![deny(missing_docs)]
#![no_std]

#[cfg(test)]
extern crate std;

/// Per-channel intensities and the extent of the frame that carries them.
pub mod channel_buffer;

pub mod bridge;
pub mod configuration;
pub mod dispatch;
pub mod dmx;
pub mod midi;
pub mod status;

#[cfg(test)]
mod mock;
