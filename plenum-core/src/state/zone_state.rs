//! Zone operating states and thermostat demand signals

use super::mode::ThermalKind;

/// Demand signals read from one zone thermostat
///
/// Wire names follow the 24VAC thermostat convention. OB is the
/// changeover line: asserted for a heating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemandSignals {
    /// Stage 1 compressor/heat call
    pub y1: bool,
    /// Stage 2 compressor/heat call
    pub y2: bool,
    /// Fan call
    pub g: bool,
    /// Heat/cool changeover
    pub ob: bool,
}

impl DemandSignals {
    /// All signals released
    pub const fn idle() -> Self {
        Self {
            y1: false,
            y2: false,
            g: false,
            ob: false,
        }
    }

    /// Build from individual wires
    pub const fn new(y1: bool, y2: bool, g: bool, ob: bool) -> Self {
        Self { y1, y2, g, ob }
    }

    /// A compressor or heat stage is called without the fan
    ///
    /// Running a stage with no air moving is the fault condition the
    /// zone error counter debounces.
    pub fn stage_without_fan(&self) -> bool {
        (self.y1 || self.y2) && !self.g
    }

    /// Derive the operating state these signals request
    ///
    /// Highest priority match wins. The fault check is not part of this;
    /// see [`crate::zone::Zone::calc_state`].
    pub fn requested_state(&self) -> ZoneState {
        let Self { y1, y2, g, ob } = *self;

        if y2 && g && ob {
            ZoneState::HeatingStage2
        } else if y1 && g && ob {
            ZoneState::HeatingStage1
        } else if y2 && g && !ob {
            ZoneState::CoolingStage2
        } else if y1 && g && !ob {
            ZoneState::CoolingStage1
        } else if g {
            ZoneState::FanOnly
        } else {
            ZoneState::Off
        }
    }
}

/// Zone operating state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneState {
    /// No demand
    #[default]
    Off,
    /// Fan call only
    FanOnly,
    CoolingStage1,
    CoolingStage2,
    HeatingStage1,
    HeatingStage2,
    /// Post-demand fan run clearing the ductwork
    Purge,
    /// Real demand deferred behind a higher-priority zone
    Wait,
    /// Confirmed stage-without-fan fault
    Error,
}

impl ZoneState {
    /// Arbitration priority
    ///
    /// PURGE(6) > HEATING(4) > COOLING(2) > FAN_ONLY(1) > everything else.
    pub const fn priority(&self) -> u8 {
        match self {
            ZoneState::Purge => 6,
            ZoneState::HeatingStage1 | ZoneState::HeatingStage2 => 4,
            ZoneState::CoolingStage1 | ZoneState::CoolingStage2 => 2,
            ZoneState::FanOnly => 1,
            ZoneState::Off | ZoneState::Wait | ZoneState::Error => 0,
        }
    }

    pub const fn is_heating(&self) -> bool {
        matches!(self, ZoneState::HeatingStage1 | ZoneState::HeatingStage2)
    }

    pub const fn is_cooling(&self) -> bool {
        matches!(self, ZoneState::CoolingStage1 | ZoneState::CoolingStage2)
    }

    /// Heating or cooling: the states that run a compressor or heat stage
    pub const fn is_active(&self) -> bool {
        self.is_heating() || self.is_cooling()
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, ZoneState::Error)
    }

    /// Thermal kind of an active state
    pub const fn thermal_kind(&self) -> Option<ThermalKind> {
        if self.is_heating() {
            Some(ThermalKind::Heating)
        } else if self.is_cooling() {
            Some(ThermalKind::Cooling)
        } else {
            None
        }
    }

    /// Human-readable label for logs and status displays
    pub const fn label(&self) -> &'static str {
        match self {
            ZoneState::Off => "Off",
            ZoneState::FanOnly => "Fan Only",
            ZoneState::CoolingStage1 => "Cooling Stage 1",
            ZoneState::CoolingStage2 => "Cooling Stage 2",
            ZoneState::HeatingStage1 => "Heating Stage 1",
            ZoneState::HeatingStage2 => "Heating Stage 2",
            ZoneState::Purge => "Purge",
            ZoneState::Wait => "Wait",
            ZoneState::Error => "ERROR",
        }
    }
}
