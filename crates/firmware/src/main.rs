//! MIDI DMX Bridge is [Embassy](https://embassy.dev)-based firmware which lets USB MIDI drive stage lighting over
//! [DMX512](https://en.wikipedia.org/wiki/DMX512). The firmware runs on the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series STM32
//! microcontroller, with an RS-485 transceiver on the USART2 TX pin.
//!
//! Each Note On sets the DMX channel numbered by the note to an intensity derived from its velocity; each Note Off
//! darkens it. After every change the whole universe, up to the highest channel touched so far, is retransmitted.
//!
//! For details about the hardware or how to use the device, see the `README`.

#![no_std]
#![no_main]

mod dmx_line;
mod velocity_curve;

use crate::{
    dmx_line::DmxLine,
    velocity_curve::{
        VELOCITY_CURVE_SYNC, VelocityCurveSpy, display_velocity_curve, select_velocity_curve,
    },
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config, bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usart::{self, DataBits, Parity, StopBits, UartTx},
    usb,
};
use embassy_time::Delay;
use embassy_usb::{Builder, UsbDevice, class::midi::MidiClass, driver::EndpointError};
use midi_dmx_bridge_lib::{
    bridge::Bridge,
    configuration::VelocityCurve,
    dmx::{DMX_BAUD, FrameTiming, Transmitter},
    midi::UsbMidiPackets,
    status::{FaultCode, StatusIndicator},
};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;
type DmxBridge = Bridge<DmxLine, Delay, Output<'static>>;
type StatusLed = StatusIndicator<Output<'static>, Delay>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing MIDI DMX Bridge");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410: the 48MHz clock used for USB OTG FS is derived from main PLL VCO (PLLQ clock)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        // USART2 hangs off APB1: 216Mhz / 4 = 54Mhz, which divides evenly into 250kbps (BRR = 216)
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    // red LED (LD3): power-up greeting, and fault patterns should anything prove unrecoverable
    let mut status = StatusIndicator::new(Output::new(p.PB14, Level::Low, Speed::Low), Delay);
    status.greet();

    // DMX512 line: 250kbps, 8 data bits, 2 stop bits, no parity; per the Nucleo-144 pinout, PD5 is USART2 TX
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = DMX_BAUD;
    uart_config.data_bits = DataBits::DataBits8;
    uart_config.stop_bits = StopBits::STOP2;
    uart_config.parity = Parity::ParityNone;
    let uart = match UartTx::new_blocking(p.USART2, p.PD5, uart_config) {
        Ok(uart) => uart,
        Err(err) => {
            error!("DMX line configuration rejected: {}", err);
            status.fault(FaultCode::SerialLine)
        }
    };

    // green LED (LD1) is lit for as long as a frame is on the wire
    let busy_led = Output::new(p.PB0, Level::Low, Speed::Low);
    let transmitter = Transmitter::new(DmxLine::new(uart), Delay, busy_led, FrameTiming::default());
    let bridge: DmxBridge = Bridge::new(transmitter, VelocityCurve::default());

    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(select_velocity_curve(button, VELOCITY_CURVE_SYNC.sender())));

    // blue LED (LD2)
    let blue_led = Output::new(p.PB7, Level::Low, Speed::Low);
    let velocity_curve_receiver = VELOCITY_CURVE_SYNC
        .receiver()
        .expect("Velocity curve synchronizer should have a receiver available");
    unwrap!(spawner.spawn(display_velocity_curve(blue_led, velocity_curve_receiver)));

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // USB devices which are self-powered (i.e., that can stay powered on if unplugged from the host)
    // need to enable vbus_detection to comply with the USB spec. Per section 6.10 of the Nucleo board
    // manual (UM1974), CN13 (the USB port) cannot power the board; external power is necessary.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    // product ID nods to the protocol on the other side of the bridge
    let product_id = 0x0512;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("MIDI DMX Bridge");
    config.self_powered = true;
    config.max_power = 0;

    // Create embassy-usb DeviceBuilder using the driver and config.
    // It needs some buffers for building the descriptors.
    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    let class = MidiClass::new(&mut builder, 0, 1, 64);
    let usb = builder.build();

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(midi_task(
        class,
        bridge,
        status,
        VELOCITY_CURVE_SYNC.anon_receiver()
    )));
}

/// Housekeeping for the USB stack: enumeration, control requests, bus events.
#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// Task responsible for turning inbound MIDI into DMX frames.
///
/// Owns the [`Bridge`], and with it the channel intensities and the DMX line, for the life of the device. Transmission
/// blocks, so while a frame is being sent no other task runs.
#[embassy_executor::task]
async fn midi_task(
    mut class: MidiClass<'static, UsbDriver>,
    mut bridge: DmxBridge,
    mut status: StatusLed,
    mut velocity_curve: VelocityCurveSpy<'static>,
) -> ! {
    loop {
        class.wait_connection().await;
        info!("USB connected");
        match process_midi(&mut class, &mut bridge, &mut velocity_curve).await {
            Err(Interruption::Fault(fault)) => status.fault(fault),
            Err(Interruption::Disconnected) | Ok(()) => info!("USB disconnected"),
        }
    }
}

#[doc(hidden)]
enum Interruption {
    Disconnected,
    Fault(FaultCode),
}

impl From<EndpointError> for Interruption {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => Interruption::Fault(FaultCode::UsbEndpoint),
            EndpointError::Disabled => Interruption::Disconnected,
        }
    }
}

/// Helper function which interprets data received over USB.
///
/// Every USB-MIDI Event Packet in a transfer is handled before the next read, so all the notes of a chord land
/// before control returns to the executor.
async fn process_midi<'d, T: usb::Instance + 'd>(
    class: &mut MidiClass<'d, usb::Driver<'d, T>>,
    bridge: &mut DmxBridge,
    velocity_curve: &mut VelocityCurveSpy<'static>,
) -> Result<(), Interruption> {
    let mut buf = [0; 64];
    loop {
        let n = class.read_packet(&mut buf).await?;

        if let Some(curve) = velocity_curve.try_get() {
            bridge.set_velocity_curve(curve);
        }

        let frames = bridge.service(&mut UsbMidiPackets::new(&buf[..n]));
        debug!(
            "Sent {} frame(s) covering {} channel(s)",
            frames,
            bridge.channels().snapshot_len()
        );
    }
}
