//! Board-agnostic core logic for the zoning controller
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Zone state derivation and short-cycle protection
//! - Cross-zone purge and priority arbitration
//! - Damper target planning and relay sequencing
//! - Central-unit mode selection with stage-2 escalation
//! - The per-tick controller pipeline
//! - Configuration types and the TOML configuration parser
//! - Hardware abstraction traits (thermostat inputs, relays, mode mirror)
//!
//! Nothing in here touches a pin or a clock: time is passed in as a
//! millisecond timestamp and every pass reports what it did through a
//! [`controller::TickReport`].

#![no_std]
#![deny(unsafe_code)]

pub mod arbiter;
pub mod config;
pub mod controller;
pub mod damper;
pub mod state;
pub mod traits;
pub mod unit;
pub mod zone;

pub use controller::{TickReport, ZoneIndexError, ZoningController};
