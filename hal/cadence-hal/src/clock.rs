//! Clock frequency source
//!
//! The frequency feeding a timer's counter depends on the bus prescaler tree
//! and can change at runtime (e.g. after a system clock reconfiguration), so
//! it is exposed as a live query rather than a compile-time constant.

/// Source of the effective input clock frequency for a timer peripheral
pub trait ClockSource {
    /// Current timer input clock frequency in Hz
    ///
    /// Callers must re-query after any system clock change; cached values
    /// go stale.
    fn timer_clock_hz(&self) -> u32;
}

/// Fixed clock source with a known frequency
///
/// Useful for boards that never reconfigure their clock tree, and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedClock {
    hz: u32,
}

impl FixedClock {
    /// Create a fixed clock source
    pub const fn new(hz: u32) -> Self {
        Self { hz }
    }
}

impl ClockSource for FixedClock {
    fn timer_clock_hz(&self) -> u32 {
        self.hz
    }
}
