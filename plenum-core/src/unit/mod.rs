//! Central-unit control
//!
//! Reduces the zone snapshot to one equipment mode. The output pattern for
//! each mode lives in [`crate::state::mode`].

pub mod selector;

pub use selector::{ModeSelector, UnitDemand};
