//! Central-unit mode selection with stage-2 escalation
//!
//! The global max priority picks a base mode. Heating or cooling goes
//! straight to stage 2 when a zone of that kind calls Y2. Otherwise a
//! stage-1 base opens an episode; if the episode runs for the escalation delay the
//! unit steps up to stage 2 and stays there until the episode ends. Any
//! zone in error forces the unit idle and ends the episode.

use crate::state::{ControlEvent, EventLog, ModeChange, ThermalKind, UnitMode, ZoneState};
use crate::zone::Zone;

/// What the zones ask of the central unit this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnitDemand {
    pub max_priority: u8,
    /// An enabled zone is in a confirmed fault
    pub zone_error: bool,
    /// An enabled zone calls cooling stage 2
    pub cooling_stage2: bool,
    /// An enabled zone calls heating stage 2
    pub heating_stage2: bool,
}

impl UnitDemand {
    /// Summarize the zones' working states after arbitration
    pub fn from_zones(zones: &[Zone], max_priority: u8, zone_error: bool) -> Self {
        let calls = |state: ZoneState| {
            zones
                .iter()
                .any(|z| z.is_enabled() && z.state_new() == state)
        };
        Self {
            max_priority,
            zone_error,
            cooling_stage2: calls(ZoneState::CoolingStage2),
            heating_stage2: calls(ZoneState::HeatingStage2),
        }
    }
}

/// Mode selector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeSelector {
    current: UnitMode,
    last_active: Option<ThermalKind>,
    stage1_start_ms: Option<u64>,
    locked_out: bool,
}

impl ModeSelector {
    pub const fn new() -> Self {
        Self {
            current: UnitMode::Idle,
            last_active: None,
            stage1_start_ms: None,
            locked_out: false,
        }
    }

    pub fn current(&self) -> UnitMode {
        self.current
    }

    /// Heating or cooling, whichever ran most recently
    pub fn last_active(&self) -> Option<ThermalKind> {
        self.last_active
    }

    pub fn stage1_start_ms(&self) -> Option<u64> {
        self.stage1_start_ms
    }

    /// Forget the running stage-1 episode
    ///
    /// Used when automatic mode is switched off so a stale start time cannot
    /// escalate the moment it comes back.
    pub fn suspend(&mut self) {
        self.stage1_start_ms = None;
    }

    /// Base mode for the zone demand
    ///
    /// Selecting heating or cooling remembers the kind for the purge flavour.
    fn base_mode(&mut self, demand: UnitDemand) -> UnitMode {
        match demand.max_priority {
            1 => UnitMode::Fan,
            2 => {
                self.last_active = Some(ThermalKind::Cooling);
                if demand.cooling_stage2 {
                    UnitMode::CoolingStage2
                } else {
                    UnitMode::CoolingStage1
                }
            }
            4 => {
                self.last_active = Some(ThermalKind::Heating);
                if demand.heating_stage2 {
                    UnitMode::HeatingStage2
                } else {
                    UnitMode::HeatingStage1
                }
            }
            6 => UnitMode::purge_after(self.last_active),
            _ => UnitMode::Idle,
        }
    }

    /// Pick the mode for this tick
    ///
    /// Returns the change if the mode moved.
    pub fn select(
        &mut self,
        now_ms: u64,
        demand: UnitDemand,
        escalation_ms: u64,
        events: &mut EventLog,
    ) -> Option<ModeChange> {
        let mode = if demand.zone_error {
            self.stage1_start_ms = None;
            if !self.locked_out {
                let _ = events.push(ControlEvent::EquipmentLockout);
            }
            self.locked_out = true;
            UnitMode::Idle
        } else {
            self.locked_out = false;
            let base = self.base_mode(demand);
            self.escalate(base, now_ms, escalation_ms, events)
        };

        if mode == self.current {
            return None;
        }

        let change = ModeChange {
            from: self.current,
            to: mode,
            max_priority: demand.max_priority,
        };
        self.current = mode;
        Some(change)
    }

    /// Apply the stage-2 rule to a base mode
    fn escalate(
        &mut self,
        base: UnitMode,
        now_ms: u64,
        escalation_ms: u64,
        events: &mut EventLog,
    ) -> UnitMode {
        if !base.is_stage1() {
            self.stage1_start_ms = None;
            return base;
        }

        let stage2 = base.escalated();
        let in_episode = self.current == base || self.current == stage2;

        let start = match self.stage1_start_ms {
            Some(start) if in_episode => start,
            _ => {
                self.stage1_start_ms = Some(now_ms);
                let _ = events.push(ControlEvent::Stage1Armed { escalation_ms });
                return base;
            }
        };

        let elapsed = now_ms.saturating_sub(start);
        if escalation_ms > 0 && elapsed >= escalation_ms {
            if self.current != stage2 {
                let _ = events.push(ControlEvent::Stage2Escalated { elapsed_ms: elapsed });
            }
            stage2
        } else {
            base
        }
    }
}
