//! Drives the DMX bus through USART2, transmitting on port D, pin 5.
//!
//! The HAL's blocking UART handles the bytes. The break and mark-after-break are below anything a UART can frame, so
//! for those the pin is switched out of its alternate function and driven as a plain GPIO output via the PAC.

use defmt::warn;
use embassy_stm32::{
    mode::Blocking,
    pac::{self, gpio::vals::Moder},
    usart::UartTx,
};
use midi_dmx_bridge_lib::dmx::{LineLevel, SerialLine};

/// Index of the TX pin within GPIOD; must match the pin handed to the [`UartTx`].
const TX_PIN: usize = 5;

/// A [`SerialLine`] backed by USART2.
pub struct DmxLine {
    uart: UartTx<'static, Blocking>,
}

impl DmxLine {
    /// Takes over a UART already configured for DMX512 (250,000 bit/s, 8N2) on USART2/PD5, leaving the transmitter
    /// disabled and the line idling high.
    pub fn new(uart: UartTx<'static, Blocking>) -> Self {
        let mut line = Self { uart };
        line.disable_transmitter();
        line
    }
}

impl SerialLine for DmxLine {
    fn enable_transmitter(&mut self) {
        // per RM0410, setting TE queues an idle character (a full slot of mark), lengthening the mark-after-break by 44 µs
        pac::USART2.cr1().modify(|w| w.set_te(true));
        pac::GPIOD
            .moder()
            .modify(|w| w.set_moder(TX_PIN, Moder::ALTERNATE));
    }

    fn disable_transmitter(&mut self) {
        // hand the pin to GPIO, already at mark, before the UART lets go, so the line never drops between frames
        self.set_line_level(LineLevel::High);
        pac::GPIOD
            .moder()
            .modify(|w| w.set_moder(TX_PIN, Moder::OUTPUT));
        pac::USART2.cr1().modify(|w| w.set_te(false));
    }

    fn send_byte(&mut self, byte: u8) {
        // blocking_write waits for TXE before loading the byte; blocking_flush waits for TC
        let sent = self
            .uart
            .blocking_write(&[byte])
            .and_then(|()| self.uart.blocking_flush());
        if let Err(err) = sent {
            warn!("DMX slot not sent: {}", err);
        }
    }

    fn set_line_level(&mut self, level: LineLevel) {
        match level {
            LineLevel::Low => pac::GPIOD.bsrr().write(|w| w.set_br(TX_PIN, true)),
            LineLevel::High => pac::GPIOD.bsrr().write(|w| w.set_bs(TX_PIN, true)),
        }
    }
}
