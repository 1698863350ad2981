//! Tasks and types related to the user-selectable [velocity curve](`VelocityCurve`).

use defmt::info;
use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{AnonReceiver, Receiver, Sender, Watch},
};
use embassy_time::Timer;
use midi_dmx_bridge_lib::configuration::{CycleConfig, VelocityCurve};

const VELOCITY_CURVE_RECEIVER_CNT: usize = 1;
/// Syncs the [velocity curve](`VelocityCurve`) config across tasks.
pub static VELOCITY_CURVE_SYNC: Watch<
    CriticalSectionRawMutex,
    VelocityCurve,
    VELOCITY_CURVE_RECEIVER_CNT,
> = Watch::new_with(VelocityCurve::Full);
pub type VelocityCurveSender<'a> =
    Sender<'a, CriticalSectionRawMutex, VelocityCurve, VELOCITY_CURVE_RECEIVER_CNT>;
pub type VelocityCurveReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, VelocityCurve, VELOCITY_CURVE_RECEIVER_CNT>;
pub type VelocityCurveSpy<'a> =
    AnonReceiver<'a, CriticalSectionRawMutex, VelocityCurve, VELOCITY_CURVE_RECEIVER_CNT>;

/// Handles button presses, cycling through the [`VelocityCurve`] configurations.
#[embassy_executor::task]
pub async fn select_velocity_curve(
    mut button: ExtiInput<'static>,
    velocity_curve: VelocityCurveSender<'static>,
) -> ! {
    loop {
        button.wait_for_rising_edge().await;

        let new_state = velocity_curve
            .try_get()
            .expect("Velocity curve state should never be uninitialized")
            .cycle();
        info!("Velocity curve is now {}", new_state);
        velocity_curve.send(new_state);
    }
}

/// Status indicator for the selected [`VelocityCurve`].
///
/// Each cycle is divided in half. The LED remains dark for one half. For the other, it lights up N times, where N is one
/// more than the index of the selected curve: once for [`VelocityCurve::Full`], twice for [`VelocityCurve::Doubled`] and
/// so on.
#[embassy_executor::task]
pub async fn display_velocity_curve(
    mut led: Output<'static>,
    mut velocity_curve: VelocityCurveReceiver<'static>,
) -> ! {
    const HALF_CYCLE_MICROS: u64 = 1_000_000;

    loop {
        led.set_low();
        Timer::after_micros(HALF_CYCLE_MICROS).await;

        let blink_cnt = { velocity_curve.get().await as u8 }.saturating_add(1);
        // mult by two to account for the "off" periods, sub 1 so the LED always starts and ends lit
        let animation_frames = blink_cnt * 2 - 1;
        for _ in 0..animation_frames {
            led.toggle();
            Timer::after_micros(HALF_CYCLE_MICROS / u64::from(animation_frames)).await;
        }
    }
}
