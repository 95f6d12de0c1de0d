//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in plenum-core over `embedded-hal` digital pins:
//!
//! - Relay outputs with active-low support
//! - Thermostat inputs (Y1/Y2/G/OB) and switch inputs
//! - Interlocked damper relay pairs
//! - The central-unit output bank (equipment terminals and lamps)

#![no_std]
#![deny(unsafe_code)]

pub mod damper;
pub mod input;
pub mod relay;
pub mod unit;

pub use damper::RelayDamper;
pub use input::{InputLine, ThermostatInputs};
pub use relay::GpioRelay;
pub use unit::EquipmentBank;
