//! The boundary between the frame transmitter and whatever UART drives the DMX bus.

/// Electrical level of the transmit line while it is driven directly rather than by the UART.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineLevel {
    /// Logical low; the "space" state used for the break.
    Low,
    /// Logical high; the idle "mark" state of the bus.
    High,
}

/// A UART-like peripheral configured for DMX512 (250,000 bit/s, 8 data bits, 2 stop bits, no parity), plus raw control of
/// its transmit line.
///
/// Every method blocks until the hardware has done what was asked. Implementations are expected to busy-wait: DMX
/// timing depends on it, and nothing else is meant to run while a frame is on the wire. None of these operations can fail.
///
/// Implementations should leave the transmitter disabled and the line at [`LineLevel::High`] once configured.
pub trait SerialLine {
    /// Hand control of the transmit line to the UART so that bytes may be sent.
    fn enable_transmitter(&mut self);

    /// Take control of the transmit line away from the UART, leaving it to be driven by [`set_line_level`][Self::set_line_level].
    fn disable_transmitter(&mut self);

    /// Blocks until the data register is empty, writes `byte`, then blocks until the whole character (start, data and stop
    /// bits) has left the shift register.
    ///
    /// Waiting for the shift register, rather than just the data register, is required: the break which begins the next
    /// frame can only be driven once the UART has let go of the line.
    fn send_byte(&mut self, byte: u8);

    /// Drive the transmit line to `level`. Only meaningful while the transmitter is disabled.
    fn set_line_level(&mut self, level: LineLevel);
}
