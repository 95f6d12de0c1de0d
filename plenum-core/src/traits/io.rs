//! Zoning I/O traits
//!
//! The controller reads thermostats and writes relays only through these
//! seams, so the same logic runs against GPIO drivers on the target and
//! against mocks on the host.

use crate::damper::RelayPhase;
use crate::state::{DemandSignals, OutputPattern, UnitMode};

/// Errors from zoning I/O
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Underlying pin operation failed
    Pin,
}

/// Source of one zone's thermostat demand
pub trait ThermostatInput {
    /// Sample Y1, Y2, G and O/B
    fn read(&mut self) -> Result<DemandSignals, IoError>;
}

/// One damper's open/close relay pair
///
/// Implementations must never leave both relays energized.
pub trait DamperActuator {
    /// Apply a sequencer phase
    fn apply(&mut self, phase: RelayPhase) -> Result<(), IoError>;

    /// Current relay levels as (open, close)
    fn relays(&self) -> (bool, bool);
}

/// Central-unit equipment terminals and front-panel lamps
pub trait EquipmentOutput {
    /// Drive every output to the pattern
    fn apply(&mut self, pattern: &OutputPattern) -> Result<(), IoError>;

    /// Drive the error lamp
    fn set_error_indicator(&mut self, on: bool) -> Result<(), IoError>;
}

/// External single-select mirror of the current mode
pub trait ModeIndicator {
    fn publish(&mut self, mode: UnitMode);
}
