//! Events reported by the control passes
//!
//! The core never logs. Each pass pushes what it did into the tick report
//! and the firmware decides how loudly to say it.

use heapless::Vec;

use super::mode::UnitMode;
use super::zone_state::ZoneState;
use crate::config::MAX_ZONES;

/// Capacity of the per-tick event log
///
/// A zone reports at most four events per tick; the unit adds two.
pub const MAX_EVENTS: usize = 4 * MAX_ZONES + 4;

/// Events collected over one tick
pub type EventLog = Vec<ControlEvent, MAX_EVENTS>;

/// Something a pass did or decided during a tick
///
/// Zone numbers are zero-based indices; add one when presenting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    // Zone safety
    /// Stage called without fan, not yet confirmed
    ErrorSuspected { zone: u8, count: u8 },
    /// Stage without fan seen on consecutive ticks
    ErrorConfirmed { zone: u8 },
    /// Fault condition released after `count` bad ticks
    ErrorCleared { zone: u8, count: u8 },

    // Short-cycle protection
    /// Zone entered an active run; the cycle clock starts now
    CycleStarted { zone: u8 },
    /// Zone wanted to stop but is held inside the minimum run time
    ShortCycleHold {
        zone: u8,
        elapsed_ms: u64,
        required_ms: u64,
    },

    // Purge
    /// Purge postponed while the minimum run time is not met
    PurgeDeferred { zone: u8 },
    /// Purge window armed
    PurgeStarted { zone: u8, duration_ms: u64 },
    /// A zone of the same kind is still active, so no purge is needed
    PurgeSkipped { zone: u8 },
    /// Purge window expired
    PurgeComplete { zone: u8 },

    // Central unit
    /// Tick skipped because no zones are configured
    NoZonesConfigured,
    /// An enabled zone is in error; the unit was forced idle
    EquipmentLockout,
    /// Stage-1 episode began; escalation due after `escalation_ms`
    Stage1Armed { escalation_ms: u64 },
    /// Stage-1 ran long enough to bring in stage 2
    Stage2Escalated { elapsed_ms: u64 },
}

/// Committed zone state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub zone: u8,
    pub from: ZoneState,
    pub to: ZoneState,
}

/// Central-unit mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeChange {
    pub from: UnitMode,
    pub to: UnitMode,
    /// Global max priority that produced the new mode
    pub max_priority: u8,
}
