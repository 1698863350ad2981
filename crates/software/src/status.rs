//! Blink patterns for the device's status LED.
//!
//! With no display, the LED is the only way the device can talk to a performer: a short greeting at power-up, and a
//! repeating pattern when something has gone wrong badly enough that the device has given up.

use core::convert::Infallible;
use embedded_hal::{delay::DelayNs, digital::OutputPin};

/// Unrecoverable conditions, numbered by how many times the LED blinks for each.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultCode {
    /// The UART rejected the DMX512 line configuration.
    SerialLine = 1,
    /// The USB MIDI endpoints could not be used.
    UsbEndpoint = 2,
}

impl FaultCode {
    /// Number of blinks in each repetition of the fault pattern.
    pub fn blinks(&self) -> u8 {
        *self as u8
    }
}

const GREETING_BLINKS: u8 = 3;
const GREETING_MS: u32 = 100;
const FAULT_BLINK_MS: u32 = 250;
const FAULT_PAUSE_MS: u32 = 1_000;

/// Drives a status LED through its blink patterns. Every pattern blocks while it plays.
pub struct StatusIndicator<P, D> {
    led: P,
    delay: D,
}

impl<P: OutputPin<Error = Infallible>, D: DelayNs> StatusIndicator<P, D> {
    /// Constructs a [`StatusIndicator`] with the LED off.
    pub fn new(mut led: P, delay: D) -> Self {
        let Ok(()) = led.set_low();
        Self { led, delay }
    }

    /// Lights the LED `count` times for `on_ms`, with equally long dark periods in between and after.
    fn blink(&mut self, count: u8, on_ms: u32) {
        for _ in 0..count {
            let Ok(()) = self.led.set_high();
            self.delay.delay_ms(on_ms);
            let Ok(()) = self.led.set_low();
            self.delay.delay_ms(on_ms);
        }
    }

    /// Three quick blinks, signalling that the device has powered up.
    pub fn greet(&mut self) {
        self.blink(GREETING_BLINKS, GREETING_MS);
    }

    /// Plays the pattern for `fault` forever: its number of blinks, a pause, repeat. Only a reset gets the device out.
    pub fn fault(&mut self, fault: FaultCode) -> ! {
        #[cfg(feature = "defmt")]
        defmt::error!("Fault {}; halting", fault);

        loop {
            self.play_fault(fault);
        }
    }

    /// One repetition of the pattern for `fault`.
    fn play_fault(&mut self, fault: FaultCode) {
        self.blink(fault.blinks(), FAULT_BLINK_MS);
        self.delay.delay_ms(FAULT_PAUSE_MS);
    }
}
