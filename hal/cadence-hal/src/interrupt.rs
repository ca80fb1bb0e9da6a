//! Interrupt controller configuration
//!
//! One-time NVIC setup performed during bring-up: relocating the vector
//! table and selecting the preemption/sub-priority split. Individual IRQ
//! enable/priority assignment stays with the chip HAL.

/// Memory region holding the interrupt vector table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VectorTableBase {
    /// Vector table in flash (the usual case after reset)
    #[default]
    Flash,
    /// Vector table relocated to RAM
    Ram,
}

/// NVIC priority grouping: how priority bits split between preemption
/// priority and sub-priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PriorityGrouping {
    /// All implemented bits are preemption priority, no sub-priority
    #[default]
    AllPreemption,
    /// All implemented bits are sub-priority, no preemption
    AllSub,
    /// Split: 3 preemption bits, 1 sub-priority bit
    Split3x1,
    /// Split: 2 preemption bits, 2 sub-priority bits
    Split2x2,
    /// Split: 1 preemption bit, 3 sub-priority bits
    Split1x3,
}

/// Interrupt controller bring-up operations
pub trait InterruptConfig {
    /// Point the vector table at `base` plus a byte offset
    ///
    /// The offset must respect the controller's alignment requirement
    /// (512 bytes on Cortex-M); implementations may mask accordingly.
    fn set_vector_table(&mut self, base: VectorTableBase, offset: u32);

    /// Select the preemption/sub-priority bit split
    fn set_priority_grouping(&mut self, grouping: PriorityGrouping);
}
