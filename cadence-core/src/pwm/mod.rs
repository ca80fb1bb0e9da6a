//! Multi-channel PWM timer configuration
//!
//! One free-running up-counter drives N edge-aligned PWM channels. The
//! counter tick rate is `clock / (prescaler + 1)`, the output frequency is
//! the tick rate divided by `(period + 1)`, and each channel's duty cycle is
//! `compare / period`. All channels share the single counter, so they share
//! one period and prescaler; only compare values and output enables are
//! per-channel.
//!
//! Derivation is split into pure functions ([`compute_prescaler`],
//! [`compute_period_and_compares`]) and a [`PwmEngine`] that programs the
//! derived values into a [`PwmTimer`](cadence_hal::PwmTimer) in an order
//! that can never glitch an enabled output.

mod compute;
mod engine;

pub use compute::{compute_compare, compute_period_and_compares, compute_prescaler};
pub use engine::{ApplyError, PwmEngine};

use heapless::Vec;

/// Maximum PWM channels per timer instance
pub const MAX_CHANNELS: usize = 8;

/// Errors from PWM configuration derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Computed prescaler does not fit the timer's register width
    PrescalerOverflow,
    /// Computed period does not fit the timer's register width
    PeriodOverflow,
    /// Duty cycle outside [0.0, 1.0]
    InvalidDutyCycle,
    /// Frequency is zero, or a target exceeds its source frequency
    InvalidFrequency,
    /// Channel count disagrees with the config or exceeds the timer's channels
    ChannelMismatch,
}

/// Desired state for one PWM channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSpec {
    /// Duty cycle as a fraction in [0.0, 1.0]
    pub duty_cycle: f32,
    /// Whether the channel's output is connected to its pin
    pub enabled: bool,
}

impl ChannelSpec {
    /// Channel with the given duty cycle, output enabled
    pub const fn new(duty_cycle: f32) -> Self {
        Self {
            duty_cycle,
            enabled: true,
        }
    }

    /// Channel with the given duty cycle, output disconnected
    ///
    /// The compare value is still programmed, so the channel can later be
    /// enabled without touching the time base.
    pub const fn disabled(duty_cycle: f32) -> Self {
        Self {
            duty_cycle,
            enabled: false,
        }
    }
}

impl Default for ChannelSpec {
    fn default() -> Self {
        Self::disabled(0.0)
    }
}

/// Derived register values for one timer instance
///
/// Computed per (clock, target) pair and applied immediately; never cached
/// across clock reconfigurations. All values are range-checked against the
/// timer's register width at derivation and again at apply time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Counter prescaler register value (PSC)
    pub prescaler: u32,
    /// Counter period register value (ARR)
    pub period: u32,
    /// Per-channel compare register values (CCRx), each <= `period`
    pub compares: Vec<u32, MAX_CHANNELS>,
}

impl TimerConfig {
    /// Derive a full configuration from a live clock frequency and targets
    ///
    /// `counter_hz` is the desired counter tick rate, `output_hz` the desired
    /// PWM frequency. Both divisions truncate toward zero; use
    /// [`effective_counter_hz`](Self::effective_counter_hz) and
    /// [`effective_output_hz`](Self::effective_output_hz) to see what the
    /// hardware will actually produce.
    pub fn derive(
        clock_hz: u32,
        counter_hz: u32,
        output_hz: u32,
        channels: &[ChannelSpec],
        max_register_value: u32,
    ) -> Result<Self, ConfigError> {
        let prescaler = compute_prescaler(clock_hz, counter_hz, max_register_value)?;

        let mut duties: Vec<f32, MAX_CHANNELS> = Vec::new();
        for channel in channels {
            duties
                .push(channel.duty_cycle)
                .map_err(|_| ConfigError::ChannelMismatch)?;
        }

        let (period, compares) =
            compute_period_and_compares(counter_hz, output_hz, &duties, max_register_value)?;

        Ok(Self {
            prescaler,
            period,
            compares,
        })
    }

    /// Counter tick rate the hardware will actually run at
    ///
    /// Integer division truncates, so this can differ from the requested
    /// rate when the clock does not divide evenly.
    pub fn effective_counter_hz(&self, clock_hz: u32) -> u32 {
        clock_hz / (self.prescaler + 1)
    }

    /// PWM output frequency the hardware will actually produce
    pub fn effective_output_hz(&self, clock_hz: u32) -> u32 {
        self.effective_counter_hz(clock_hz) / (self.period + 1)
    }

    /// Check that every value fits the given register width
    ///
    /// A compare above the period encodes a duty cycle above 1.0 and is
    /// rejected as [`ConfigError::InvalidDutyCycle`].
    pub fn validate(&self, max_register_value: u32) -> Result<(), ConfigError> {
        if self.prescaler > max_register_value {
            return Err(ConfigError::PrescalerOverflow);
        }
        if self.period > max_register_value {
            return Err(ConfigError::PeriodOverflow);
        }
        for &compare in &self.compares {
            if compare > self.period {
                return Err(ConfigError::InvalidDutyCycle);
            }
        }
        Ok(())
    }
}
