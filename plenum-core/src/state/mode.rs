//! Central-unit operating modes and their output table
//!
//! The central unit runs in exactly one of eight modes. Each mode maps to a
//! fixed output pattern: the equipment terminals (Y1, Y2, G, O/B, W1e, W2,
//! W3) and the front-panel lamps. The table is data, indexed by mode, so it
//! can be audited and tested on its own.
//!
//! Note the O/B terminal on the equipment side is the reversing valve and is
//! energized for cooling, the opposite sense of the zone thermostat OB input.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of central-unit modes
pub const MODE_COUNT: usize = 8;

/// Heating or cooling, used to pick the purge flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThermalKind {
    Heating,
    Cooling,
}

/// Central-unit mode, indices 0-7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum UnitMode {
    /// Everything off
    #[default]
    Idle = 0,
    Fan = 1,
    CoolingStage1 = 2,
    CoolingStage2 = 3,
    HeatingStage1 = 4,
    HeatingStage2 = 5,
    /// Fan-only purge after heating (O/B released)
    PurgeHeating = 6,
    /// Fan-only purge after cooling (O/B held)
    PurgeCooling = 7,
}

impl UnitMode {
    /// All modes in index order
    pub const ALL: [UnitMode; MODE_COUNT] = [
        UnitMode::Idle,
        UnitMode::Fan,
        UnitMode::CoolingStage1,
        UnitMode::CoolingStage2,
        UnitMode::HeatingStage1,
        UnitMode::HeatingStage2,
        UnitMode::PurgeHeating,
        UnitMode::PurgeCooling,
    ];

    /// Select index of this mode
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// True for the two stage-1 modes that can escalate
    pub const fn is_stage1(self) -> bool {
        matches!(self, UnitMode::CoolingStage1 | UnitMode::HeatingStage1)
    }

    /// Stage-2 sibling of a stage-1 mode; other modes map to themselves
    pub const fn escalated(self) -> Self {
        match self {
            UnitMode::CoolingStage1 => UnitMode::CoolingStage2,
            UnitMode::HeatingStage1 => UnitMode::HeatingStage2,
            other => other,
        }
    }

    /// Thermal kind of a heating or cooling mode
    pub const fn thermal_kind(self) -> Option<ThermalKind> {
        match self {
            UnitMode::CoolingStage1 | UnitMode::CoolingStage2 => Some(ThermalKind::Cooling),
            UnitMode::HeatingStage1 | UnitMode::HeatingStage2 => Some(ThermalKind::Heating),
            _ => None,
        }
    }

    /// Purge flavour that follows the given thermal kind
    ///
    /// With no remembered kind the heating flavour is used: it leaves the
    /// reversing valve released.
    pub const fn purge_after(kind: Option<ThermalKind>) -> Self {
        match kind {
            Some(ThermalKind::Cooling) => UnitMode::PurgeCooling,
            _ => UnitMode::PurgeHeating,
        }
    }

    /// Output pattern for this mode
    pub const fn outputs(self) -> OutputPattern {
        OUTPUT_TABLE[self as usize]
    }

    /// Select option label
    pub const fn label(self) -> &'static str {
        match self {
            UnitMode::Idle => "Off",
            UnitMode::Fan => "Fan",
            UnitMode::CoolingStage1 => "Cool Stage 1",
            UnitMode::CoolingStage2 => "Cool Stage 2",
            UnitMode::HeatingStage1 => "Heat Stage 1",
            UnitMode::HeatingStage2 => "Heat Stage 2",
            UnitMode::PurgeHeating => "Purge Heat",
            UnitMode::PurgeCooling => "Purge Cool",
        }
    }
}

/// Boolean output vector for one mode
///
/// The error lamp is not part of the table; it follows the zone error flag
/// independently of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputPattern {
    pub y1: bool,
    pub y2: bool,
    pub g: bool,
    pub ob: bool,
    /// Emergency heat
    pub w1e: bool,
    /// Auxiliary heat stage 2
    pub w2: bool,
    /// Auxiliary heat stage 3
    pub w3: bool,
    pub fan_lamp: bool,
    pub heat_lamp: bool,
    pub cool_lamp: bool,
}

impl OutputPattern {
    /// Everything released
    pub const fn off() -> Self {
        Self {
            y1: false,
            y2: false,
            g: false,
            ob: false,
            w1e: false,
            w2: false,
            w3: false,
            fan_lamp: false,
            heat_lamp: false,
            cool_lamp: false,
        }
    }

    const fn new(y1: bool, y2: bool, g: bool, ob: bool, lamps: (bool, bool, bool)) -> Self {
        let (fan_lamp, heat_lamp, cool_lamp) = lamps;
        Self {
            y1,
            y2,
            g,
            ob,
            w1e: false,
            w2: false,
            w3: false,
            fan_lamp,
            heat_lamp,
            cool_lamp,
        }
    }
}

// Lamp triples are (fan, heat, cool)
const FAN: (bool, bool, bool) = (true, false, false);
const HEAT: (bool, bool, bool) = (true, true, false);
const COOL: (bool, bool, bool) = (true, false, true);

/// Mode index -> output pattern
pub const OUTPUT_TABLE: [OutputPattern; MODE_COUNT] = [
    // Idle
    OutputPattern::off(),
    // Fan
    OutputPattern::new(false, false, true, false, FAN),
    // Cooling stage 1
    OutputPattern::new(true, false, true, true, COOL),
    // Cooling stage 2
    OutputPattern::new(true, true, true, true, COOL),
    // Heating stage 1
    OutputPattern::new(true, false, true, false, HEAT),
    // Heating stage 2
    OutputPattern::new(true, true, true, false, HEAT),
    // Purge after heating
    OutputPattern::new(false, false, true, false, FAN),
    // Purge after cooling
    OutputPattern::new(false, false, true, true, FAN),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table_order() {
        for (i, mode) in UnitMode::ALL.iter().enumerate() {
            assert_eq!(mode.index() as usize, i);
        }
    }

    #[test]
    fn test_escalation_siblings() {
        assert_eq!(UnitMode::CoolingStage1.escalated(), UnitMode::CoolingStage2);
        assert_eq!(UnitMode::HeatingStage1.escalated(), UnitMode::HeatingStage2);
        assert_eq!(UnitMode::Fan.escalated(), UnitMode::Fan);
        assert!(UnitMode::HeatingStage1.is_stage1());
        assert!(!UnitMode::HeatingStage2.is_stage1());
    }

    #[test]
    fn test_idle_is_all_off() {
        assert_eq!(UnitMode::Idle.outputs(), OutputPattern::off());
    }

    #[test]
    fn test_fan_runs_in_every_non_idle_mode() {
        for mode in UnitMode::ALL.iter().skip(1) {
            let out = mode.outputs();
            assert!(out.g, "{:?} must run the blower", mode);
            assert!(out.fan_lamp);
        }
    }

    #[test]
    fn test_reversing_valve_follows_cooling() {
        assert!(UnitMode::CoolingStage1.outputs().ob);
        assert!(UnitMode::CoolingStage2.outputs().ob);
        assert!(UnitMode::PurgeCooling.outputs().ob);
        assert!(!UnitMode::HeatingStage1.outputs().ob);
        assert!(!UnitMode::HeatingStage2.outputs().ob);
        assert!(!UnitMode::PurgeHeating.outputs().ob);
    }

    #[test]
    fn test_stage2_adds_y2_only() {
        let s1 = UnitMode::HeatingStage1.outputs();
        let s2 = UnitMode::HeatingStage2.outputs();
        assert!(!s1.y2);
        assert!(s2.y2);
        assert_eq!(OutputPattern { y2: false, ..s2 }, s1);
    }

    #[test]
    fn test_auxiliary_heat_never_driven() {
        for mode in UnitMode::ALL {
            let out = mode.outputs();
            assert!(!out.w1e && !out.w2 && !out.w3);
        }
    }

    #[test]
    fn test_purge_flavour() {
        assert_eq!(
            UnitMode::purge_after(Some(ThermalKind::Cooling)),
            UnitMode::PurgeCooling
        );
        assert_eq!(
            UnitMode::purge_after(Some(ThermalKind::Heating)),
            UnitMode::PurgeHeating
        );
        assert_eq!(UnitMode::purge_after(None), UnitMode::PurgeHeating);
    }
}
