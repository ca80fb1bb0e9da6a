//! Pure derivation of timer register values
//!
//! No hardware access and no state: every function here maps inputs to
//! outputs deterministically, which is what makes the PWM configuration
//! testable on the host.
//!
//! Both frequency divisions truncate toward zero. Truncating the prescaler
//! division biases the effective tick rate away from the request rather
//! than rounding to the nearest achievable rate; callers that care read the
//! achieved rate back via `TimerConfig::effective_counter_hz`.

use heapless::Vec;

use super::{ConfigError, MAX_CHANNELS};

/// Compute the prescaler register value for a target counter tick rate
///
/// `prescaler = (clock_hz / counter_hz) - 1`, truncating. The counter then
/// ticks at `clock_hz / (prescaler + 1)`.
///
/// # Errors
/// - [`ConfigError::InvalidFrequency`] if either frequency is zero or the
///   target exceeds the clock
/// - [`ConfigError::PrescalerOverflow`] if the result does not fit
///   `max_register_value`
pub fn compute_prescaler(
    clock_hz: u32,
    counter_hz: u32,
    max_register_value: u32,
) -> Result<u32, ConfigError> {
    if clock_hz == 0 || counter_hz == 0 || counter_hz > clock_hz {
        return Err(ConfigError::InvalidFrequency);
    }

    let prescaler = clock_hz / counter_hz - 1;
    if prescaler > max_register_value {
        return Err(ConfigError::PrescalerOverflow);
    }

    Ok(prescaler)
}

/// Compute the period register value and per-channel compare values
///
/// `period = (counter_hz / output_hz) - 1`, truncating; a non-integer ratio
/// is tolerated and shows up as steady-state frequency error. Each compare
/// is `round(period * duty)`.
///
/// # Errors
/// - [`ConfigError::InvalidFrequency`] if either frequency is zero or the
///   output target exceeds the counter rate
/// - [`ConfigError::PeriodOverflow`] if the period does not fit
///   `max_register_value`
/// - [`ConfigError::InvalidDutyCycle`] if any duty is outside [0.0, 1.0]
/// - [`ConfigError::ChannelMismatch`] if more than [`MAX_CHANNELS`] duties
///   are requested
pub fn compute_period_and_compares(
    counter_hz: u32,
    output_hz: u32,
    duty_cycles: &[f32],
    max_register_value: u32,
) -> Result<(u32, Vec<u32, MAX_CHANNELS>), ConfigError> {
    if counter_hz == 0 || output_hz == 0 || output_hz > counter_hz {
        return Err(ConfigError::InvalidFrequency);
    }

    let period = counter_hz / output_hz - 1;
    if period > max_register_value {
        return Err(ConfigError::PeriodOverflow);
    }

    let mut compares = Vec::new();
    for &duty in duty_cycles {
        compares
            .push(compute_compare(period, duty)?)
            .map_err(|_| ConfigError::ChannelMismatch)?;
    }

    Ok((period, compares))
}

/// Compute one channel's compare value: `round(period * duty)`
///
/// The output is asserted while the counter is below the compare value, so
/// 0.0 gives a constant-low output and 1.0 gives full scale minus the
/// one-count resolution gap inherent to edge-aligned PWM.
///
/// # Errors
/// [`ConfigError::InvalidDutyCycle`] if `duty_cycle` is outside [0.0, 1.0]
/// (NaN included).
pub fn compute_compare(period: u32, duty_cycle: f32) -> Result<u32, ConfigError> {
    if !(0.0..=1.0).contains(&duty_cycle) {
        return Err(ConfigError::InvalidDutyCycle);
    }

    // Round half up in f64 (exact for any u32 period); min() guards the
    // duty = 1.0 edge where the +0.5 would land one count past the period.
    let compare = (period as f64 * duty_cycle as f64 + 0.5) as u32;
    Ok(compare.min(period))
}
