//! Board-agnostic bring-up logic for the Cadence firmware
//!
//! This crate contains the one-time hardware initialization logic that does
//! not depend on specific hardware implementations:
//!
//! - PWM timer derivation (clock → prescaler → period → compares)
//! - PWM engine (glitch-free register programming, duty updates)
//! - Board bring-up sequence (vector table, status LEDs, button, timer)
//!
//! Hardware access goes through the traits in `cadence-hal`, so everything
//! here is unit-tested on the host against simulated peripherals.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bringup;
pub mod pwm;
