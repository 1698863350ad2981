//! Recording test doubles for the hardware traits the crate is written against.
//!
//! All doubles append to one shared [`Log`], so tests can assert on the interleaving of line activity, delays and
//! indicator changes.

use crate::dmx::{LineLevel, SerialLine};
use core::{cell::RefCell, convert::Infallible};
use embedded_hal::{delay::DelayNs, digital};
use std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Transmitter(bool),
    Level(LineLevel),
    Byte(u8),
    /// nanoseconds
    Wait(u64),
    Pin(&'static str, bool),
}

#[derive(Default)]
pub struct Log(RefCell<Vec<Event>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn take(&self) -> Vec<Event> {
        self.0.take()
    }
}

pub struct MockLine<'a>(pub &'a Log);

impl SerialLine for MockLine<'_> {
    fn enable_transmitter(&mut self) {
        self.0.push(Event::Transmitter(true));
    }

    fn disable_transmitter(&mut self) {
        self.0.push(Event::Transmitter(false));
    }

    fn send_byte(&mut self, byte: u8) {
        self.0.push(Event::Byte(byte));
    }

    fn set_line_level(&mut self, level: LineLevel) {
        self.0.push(Event::Level(level));
    }
}

pub struct MockDelay<'a>(pub &'a Log);

impl DelayNs for MockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.push(Event::Wait(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.push(Event::Wait(u64::from(us) * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::Wait(u64::from(ms) * 1_000_000));
    }
}

pub struct MockPin<'a> {
    log: &'a Log,
    name: &'static str,
}

impl<'a> MockPin<'a> {
    pub fn busy(log: &'a Log) -> Self {
        Self { log, name: "busy" }
    }

    pub fn status(log: &'a Log) -> Self {
        Self {
            log,
            name: "status",
        }
    }
}

impl digital::ErrorType for MockPin<'_> {
    type Error = Infallible;
}

impl digital::OutputPin for MockPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Pin(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Pin(self.name, true));
        Ok(())
    }
}
