//! Hardware configuration types
//!
//! Pin bindings for the zone thermostats, damper relays, equipment outputs
//! and indicator lamps.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{TimingConfig, MAX_LABEL_LEN, MAX_ZONES};

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }
}

/// One zone's thermostat inputs and damper relays
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneHwConfig {
    /// Zone name from the section header (e.g. "upstairs")
    pub name: String<MAX_LABEL_LEN>,
    /// Thermostat Y1 input
    pub y1: Option<PinConfig>,
    /// Thermostat Y2 input
    pub y2: Option<PinConfig>,
    /// Thermostat G input
    pub g: Option<PinConfig>,
    /// Thermostat O/B input
    pub ob: Option<PinConfig>,
    /// Relay that drives the damper open
    pub damper_open: Option<PinConfig>,
    /// Relay that drives the damper closed
    pub damper_close: Option<PinConfig>,
    /// Zone takes part in control
    pub enabled: bool,
}

impl ZoneHwConfig {
    /// Create a named, enabled zone with nothing bound
    pub fn named(name: &str) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            enabled: true,
            ..Self::default()
        }
    }

    /// All four thermostat inputs are bound
    pub fn has_inputs(&self) -> bool {
        self.y1.is_some() && self.y2.is_some() && self.g.is_some() && self.ob.is_some()
    }

    /// Both damper relays are bound
    pub fn has_damper(&self) -> bool {
        self.damper_open.is_some() && self.damper_close.is_some()
    }
}

/// Central-unit outputs and indicator lamps
///
/// Every binding is optional; an unbound output is simply not driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitHwConfig {
    pub y1: Option<PinConfig>,
    pub y2: Option<PinConfig>,
    pub g: Option<PinConfig>,
    /// Reversing valve
    pub ob: Option<PinConfig>,
    /// Emergency heat
    pub w1e: Option<PinConfig>,
    pub w2: Option<PinConfig>,
    pub w3: Option<PinConfig>,
    pub heat_led: Option<PinConfig>,
    pub cool_led: Option<PinConfig>,
    pub fan_led: Option<PinConfig>,
    pub error_led: Option<PinConfig>,
}

/// Complete controller configuration
///
/// This is the top-level configuration structure that contains all
/// zone bindings, equipment bindings and timing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Zone bindings, in index order
    pub zones: Vec<ZoneHwConfig, MAX_ZONES>,
    /// Equipment outputs and lamps
    pub unit: UnitHwConfig,
    /// Controller timing
    pub timing: TimingConfig,
    /// Start in automatic mode
    pub auto_mode: bool,
    /// Optional switch that toggles automatic mode at runtime
    pub auto_mode_pin: Option<PinConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            zones: Vec::new(),
            unit: UnitHwConfig::default(),
            timing: TimingConfig::default(),
            auto_mode: true,
            auto_mode_pin: None,
        }
    }
}

impl ControllerConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of configured zones
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Find a zone by name
    pub fn find_zone(&self, name: &str) -> Option<&ZoneHwConfig> {
        self.zones.iter().find(|z| z.name.as_str() == name)
    }

    /// Index of a zone by name
    pub fn zone_index(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.name.as_str() == name)
    }
}
