//! Cadence Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs (STM32F4, RP2040, etc.). This lets the bring-up
//! and PWM derivation logic in `cadence-core` run unchanged on different
//! hardware, and be unit-tested against simulated peripherals on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Bring-up / application (cadence-core)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip HAL     │       │  host mocks   │
//! │  (registers)  │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::ButtonInput`] - Digital I/O
//! - [`timer::PwmTimer`] - PWM timer register access
//! - [`clock::ClockSource`] - Live timer clock frequency
//! - [`interrupt::InterruptConfig`] - Vector table and priority grouping

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod interrupt;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use clock::ClockSource;
pub use gpio::{ButtonInput, Edge, InputPin, OutputPin};
pub use interrupt::{InterruptConfig, PriorityGrouping, VectorTableBase};
pub use timer::PwmTimer;
