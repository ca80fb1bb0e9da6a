//! PWM timer register abstraction
//!
//! A general-purpose timer with one free-running up-counter and N output
//! compare channels in edge-aligned PWM mode. Chip HALs implement this over
//! their memory-mapped registers (PSC/ARR/CCRx/CCER on STM32 timers);
//! host tests implement it with a simulated register file.
//!
//! All register accesses are fallible: a peripheral whose bus clock is not
//! yet enabled, for example, reports an error instead of silently dropping
//! the write.

/// PWM timer peripheral register access
pub trait PwmTimer {
    /// Error reported by the underlying peripheral (e.g. clock not enabled)
    type Error;

    /// Largest value the prescaler/period/compare registers can hold
    ///
    /// 65535 for the common 16-bit timers; 32-bit timers report more. The
    /// derivation logic range-checks against this rather than hard-coding
    /// a width.
    fn max_register_value(&self) -> u32;

    /// Number of output compare channels this timer instance provides
    fn channel_count(&self) -> usize;

    /// Enable the peripheral's bus clock
    ///
    /// Must succeed before any other register write takes effect.
    fn enable_clock(&mut self) -> Result<(), Self::Error>;

    /// Write the counter prescaler register (PSC)
    fn set_prescaler(&mut self, value: u32) -> Result<(), Self::Error>;

    /// Write the counter period register (ARR)
    fn set_period(&mut self, value: u32) -> Result<(), Self::Error>;

    /// Buffer period writes until the next counter-overflow boundary
    fn enable_period_preload(&mut self) -> Result<(), Self::Error>;

    /// Write a channel's compare register (CCRx)
    ///
    /// Channels are indexed from 0.
    fn set_channel_compare(&mut self, channel: usize, value: u32) -> Result<(), Self::Error>;

    /// Buffer compare writes for `channel` until the next overflow boundary
    fn enable_channel_preload(&mut self, channel: usize) -> Result<(), Self::Error>;

    /// Connect or disconnect a channel's compare output from its pin
    fn set_channel_output_enabled(
        &mut self,
        channel: usize,
        enabled: bool,
    ) -> Result<(), Self::Error>;
}
