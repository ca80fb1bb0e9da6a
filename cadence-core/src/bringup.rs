//! One-time board bring-up sequence
//!
//! Runs once before the application's concurrent tasks start:
//!
//! 1. Point the vector table and select the NVIC priority grouping
//! 2. Drive every status LED to a known low level
//! 3. Arm the user button for edge-triggered interrupts
//! 4. Derive the PWM timer configuration from the live clock frequency and
//!    program it
//!
//! LED pins arrive from the chip HAL already configured push-pull; the
//! button's interrupt service routine is owned by the application. Starting
//! the timer's counter is also left to the caller, once bring-up has
//! returned successfully.

use cadence_hal::{
    ButtonInput, ClockSource, Edge, InterruptConfig, OutputPin, PriorityGrouping, PwmTimer,
    VectorTableBase,
};
use heapless::Vec;

use crate::pwm::{ApplyError, ChannelSpec, PwmEngine, TimerConfig, MAX_CHANNELS};

/// Default counter tick rate in Hz
pub const DEFAULT_COUNTER_HZ: u32 = 2_000;

/// Default PWM output frequency in Hz
pub const DEFAULT_OUTPUT_HZ: u32 = 1;

/// Default number of PWM channels
pub const DEFAULT_CHANNEL_COUNT: usize = 4;

/// Default duty cycle for each channel
pub const DEFAULT_DUTY_CYCLE: f32 = 0.5;

/// Bring-up parameters
///
/// The defaults reproduce the reference board setup: vector table in flash
/// at offset 0, all priority bits preemption, rising-edge button, a 2 kHz
/// counter producing 1 Hz PWM on four channels at 50 % duty with outputs
/// initially disconnected (application logic enables them later).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BringupConfig {
    /// Where the vector table lives
    pub vector_table: VectorTableBase,
    /// Byte offset of the vector table within its region
    pub vector_offset: u32,
    /// NVIC preemption/sub-priority split
    pub priority_grouping: PriorityGrouping,
    /// Edge that triggers the user-button interrupt
    pub button_edge: Edge,
    /// Desired counter tick rate in Hz
    pub counter_hz: u32,
    /// Desired PWM output frequency in Hz
    pub output_hz: u32,
    /// Per-channel duty cycle and initial enable state
    pub channels: Vec<ChannelSpec, MAX_CHANNELS>,
}

impl Default for BringupConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        for _ in 0..DEFAULT_CHANNEL_COUNT {
            // Capacity is MAX_CHANNELS >= DEFAULT_CHANNEL_COUNT
            let _ = channels.push(ChannelSpec::disabled(DEFAULT_DUTY_CYCLE));
        }
        Self {
            vector_table: VectorTableBase::Flash,
            vector_offset: 0,
            priority_grouping: PriorityGrouping::AllPreemption,
            button_edge: Edge::Rising,
            counter_hz: DEFAULT_COUNTER_HZ,
            output_hz: DEFAULT_OUTPUT_HZ,
            channels,
        }
    }
}

/// Run the bring-up sequence and hand back the configured PWM engine
///
/// The clock frequency is queried live, so calling this again after a
/// system clock change recomputes the timer values instead of reusing
/// stale ones. Derivation or peripheral errors abort before any PWM output
/// is enabled; the caller must not start the counter after an error.
pub fn bring_up<T, L, B, I, C>(
    interrupts: &mut I,
    leds: &mut [L],
    button: &mut B,
    clock: &C,
    timer: T,
    config: &BringupConfig,
) -> Result<PwmEngine<T>, ApplyError<T::Error>>
where
    T: PwmTimer,
    L: OutputPin,
    B: ButtonInput,
    I: InterruptConfig,
    C: ClockSource,
{
    interrupts.set_vector_table(config.vector_table, config.vector_offset);
    interrupts.set_priority_grouping(config.priority_grouping);

    for led in leds.iter_mut() {
        led.set_low();
    }

    button.enable_edge_interrupt(config.button_edge);

    let timer_config = TimerConfig::derive(
        clock.timer_clock_hz(),
        config.counter_hz,
        config.output_hz,
        &config.channels,
        timer.max_register_value(),
    )?;

    let mut engine = PwmEngine::new(timer);
    engine.apply(&timer_config, &config.channels)?;
    Ok(engine)
}
