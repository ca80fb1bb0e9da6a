//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs. Pin mode (push-pull, pull-up, speed) is fixed by
//! the chip HAL when it constructs the pin; these traits only move levels.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Signal edge selection for pin interrupts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Trigger on low-to-high transition
    #[default]
    Rising,
    /// Trigger on high-to-low transition
    Falling,
    /// Trigger on both transitions
    Both,
}

/// Input pin that can raise an edge-triggered interrupt
///
/// Used for user buttons. The interrupt service routine itself is owned by
/// the chip HAL / application; this trait only arms the trigger.
pub trait ButtonInput: InputPin {
    /// Arm the pin's external interrupt line for the given edge
    fn enable_edge_interrupt(&mut self, edge: Edge);

    /// Disarm the pin's external interrupt line
    fn disable_edge_interrupt(&mut self);
}
