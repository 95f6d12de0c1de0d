//! Per-tick zoning pipeline
//!
//! The controller owns every zone and runs the passes in a fixed order:
//!
//! 1. State calculation from thermostat demand
//! 2. Short-cycle protection
//! 3. Purge management
//! 4. Priority arbitration
//! 5. Damper planning
//! 6. Central-unit mode selection (automatic mode only)
//!
//! Only then is each zone's working state committed. The caller applies
//! the returned [`TickReport`] to the hardware.

use heapless::Vec;

use crate::arbiter;
use crate::config::{ControllerConfig, TimingConfig, MAX_ZONES};
use crate::damper::{self, DamperCommand};
use crate::state::{
    ControlEvent, DemandSignals, EventLog, ModeChange, OutputPattern, Transition, UnitMode,
};
use crate::unit::{ModeSelector, UnitDemand};
use crate::zone::Zone;

/// Zone index outside the configured range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZoneIndexError {
    /// Requested index
    pub index: usize,
    /// Number of zones that exist
    pub limit: usize,
}

/// Everything one tick decided
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Committed zone state changes
    pub transitions: Vec<Transition, MAX_ZONES>,
    /// Damper moves to hand to the sequencer
    pub dampers: Vec<DamperCommand, MAX_ZONES>,
    /// Mode change, if the unit moved
    pub mode_change: Option<ModeChange>,
    /// Current mode after this tick
    pub mode: UnitMode,
    /// Error lamp level; `None` leaves the lamp alone (manual mode)
    pub error_indicator: Option<bool>,
    pub global_max_priority: u8,
    pub events: EventLog,
}

impl TickReport {
    fn new(mode: UnitMode) -> Self {
        Self {
            transitions: Vec::new(),
            dampers: Vec::new(),
            mode_change: None,
            mode,
            error_indicator: None,
            global_max_priority: 0,
            events: EventLog::new(),
        }
    }

    /// Output pattern to apply, present only when the mode changed
    pub fn outputs(&self) -> Option<OutputPattern> {
        self.mode_change.map(|change| change.to.outputs())
    }

    /// True when the tick did no work
    pub fn is_skipped(&self) -> bool {
        self.events.contains(&ControlEvent::NoZonesConfigured)
    }
}

/// Multi-zone damper and central-unit controller
#[derive(Debug, Clone)]
pub struct ZoningController {
    zones: Vec<Zone, MAX_ZONES>,
    timing: TimingConfig,
    auto_mode: bool,
    global_max_priority: u8,
    zone_error: bool,
    selector: ModeSelector,
}

impl ZoningController {
    /// Create a controller for `zone_count` zones, all enabled
    pub fn new(zone_count: usize, timing: TimingConfig) -> Result<Self, ZoneIndexError> {
        if zone_count > MAX_ZONES {
            return Err(ZoneIndexError {
                index: zone_count - 1,
                limit: MAX_ZONES,
            });
        }

        let mut zones = Vec::new();
        for index in 0..zone_count {
            let _ = zones.push(Zone::new(index as u8));
        }

        Ok(Self {
            zones,
            timing,
            auto_mode: true,
            global_max_priority: 0,
            zone_error: false,
            selector: ModeSelector::new(),
        })
    }

    /// Create a controller from a parsed configuration
    pub fn from_config(config: &ControllerConfig) -> Self {
        let mut zones = Vec::new();
        for (index, hw) in config.zones.iter().enumerate() {
            let mut zone = Zone::new(index as u8);
            zone.set_enabled(hw.enabled);
            let _ = zones.push(zone);
        }

        Self {
            zones,
            timing: config.timing,
            auto_mode: config.auto_mode,
            global_max_priority: 0,
            zone_error: false,
            selector: ModeSelector::new(),
        }
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Switch automatic mode selection on or off
    ///
    /// While off the unit mode is frozen and no outputs are issued.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        if self.auto_mode && !enabled {
            self.selector.suspend();
        }
        self.auto_mode = enabled;
    }

    pub fn mode(&self) -> UnitMode {
        self.selector.current()
    }

    pub fn global_max_priority(&self) -> u8 {
        self.global_max_priority
    }

    /// Any enabled zone in a confirmed fault
    pub fn zone_error(&self) -> bool {
        self.zone_error
    }

    /// Read-only view of every zone's runtime data
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Result<&Zone, ZoneIndexError> {
        self.zones.get(index).ok_or(ZoneIndexError {
            index,
            limit: self.zones.len(),
        })
    }

    pub fn set_zone_enabled(&mut self, index: usize, enabled: bool) -> Result<(), ZoneIndexError> {
        let limit = self.zones.len();
        let zone = self
            .zones
            .get_mut(index)
            .ok_or(ZoneIndexError { index, limit })?;
        zone.set_enabled(enabled);
        Ok(())
    }

    /// Run one control tick
    ///
    /// `demands[i]` is zone `i`'s thermostat sample; missing entries read as
    /// idle.
    pub fn tick(&mut self, now_ms: u64, demands: &[DemandSignals]) -> TickReport {
        let mut report = TickReport::new(self.selector.current());

        if self.zones.is_empty() {
            let _ = report.events.push(ControlEvent::NoZonesConfigured);
            return report;
        }

        let timing = self.timing;
        let events = &mut report.events;

        for (i, zone) in self.zones.iter_mut().enumerate() {
            if zone.is_enabled() {
                let demand = demands.get(i).copied().unwrap_or_default();
                zone.calc_state(demand, events);
            }
        }

        for zone in self.zones.iter_mut().filter(|z| z.is_enabled()) {
            zone.apply_short_cycle_protection(now_ms, timing.min_cycle_ms, events);
        }

        arbiter::manage_purge(&mut self.zones, now_ms, &timing, events);

        self.global_max_priority = arbiter::arbitrate(&mut self.zones);
        self.zone_error = arbiter::any_error(&self.zones);

        report.dampers = damper::plan(
            &mut self.zones,
            self.global_max_priority,
            timing.damper_stagger_ms,
        );

        if self.auto_mode {
            let demand =
                UnitDemand::from_zones(&self.zones, self.global_max_priority, self.zone_error);
            report.mode_change = self.selector.select(
                now_ms,
                demand,
                timing.stage2_escalation_ms,
                &mut report.events,
            );
            report.error_indicator = Some(self.zone_error);
        }

        for zone in self.zones.iter_mut() {
            if let Some(transition) = zone.commit() {
                if transition.to.is_active() && !transition.from.is_active() {
                    let _ = report.events.push(ControlEvent::CycleStarted {
                        zone: transition.zone,
                    });
                }
                let _ = report.transitions.push(transition);
            }
        }

        report.mode = self.selector.current();
        report.global_max_priority = self.global_max_priority;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneHwConfig;
    use crate::damper::DamperPosition;
    use crate::state::ZoneState;

    const MIN_CYCLE: u64 = 480_000;
    const PURGE: u64 = 300_000;
    const HOUR: u64 = 3_600_000;

    fn idle() -> DemandSignals {
        DemandSignals::idle()
    }

    fn cool() -> DemandSignals {
        DemandSignals::new(true, false, true, false)
    }

    fn heat() -> DemandSignals {
        DemandSignals::new(true, false, true, true)
    }

    fn no_fan() -> DemandSignals {
        DemandSignals::new(true, false, false, true)
    }

    fn controller(zones: usize) -> ZoningController {
        ZoningController::new(zones, TimingConfig::default()).unwrap()
    }

    #[test]
    fn test_cooling_purge_off() {
        let mut ctl = controller(1);

        let report = ctl.tick(0, &[cool()]);
        assert_eq!(report.mode, UnitMode::CoolingStage1);
        assert_eq!(report.outputs(), Some(UnitMode::CoolingStage1.outputs()));
        assert_eq!(report.dampers[0].position, DamperPosition::Open);
        assert!(report
            .events
            .contains(&ControlEvent::CycleStarted { zone: 0 }));

        let report = ctl.tick(MIN_CYCLE, &[idle()]);
        assert_eq!(ctl.zones()[0].state(), ZoneState::Purge);
        assert_eq!(report.mode, UnitMode::PurgeCooling);
        assert_eq!(report.global_max_priority, 6);
        assert!(report.outputs().is_some_and(|o| o.g && o.ob && !o.y1));

        let report = ctl.tick(MIN_CYCLE + PURGE, &[idle()]);
        assert_eq!(ctl.zones()[0].state(), ZoneState::Off);
        assert_eq!(report.mode, UnitMode::Idle);
        assert_eq!(report.outputs(), Some(OutputPattern::off()));
        // Damper stays open with nothing calling
        assert!(report.dampers.is_empty());
    }

    #[test]
    fn test_short_cycle_holds_stop() {
        let mut ctl = controller(1);
        ctl.tick(0, &[cool()]);

        let report = ctl.tick(10_000, &[idle()]);
        assert!(report.transitions.is_empty());
        assert_eq!(ctl.zones()[0].state(), ZoneState::CoolingStage1);
        assert!(ctl.zones()[0].short_cycle_protection());
        assert_eq!(report.mode_change, None);
    }

    #[test]
    fn test_error_lockout_two_ticks() {
        let mut ctl = controller(2);
        ctl.tick(0, &[idle(), idle()]);

        let report = ctl.tick(10_000, &[no_fan(), heat()]);
        assert_eq!(report.error_indicator, Some(false));
        assert_eq!(ctl.zones()[0].error_count(), 1);
        assert_eq!(report.mode, UnitMode::HeatingStage1);

        let report = ctl.tick(20_000, &[no_fan(), heat()]);
        assert_eq!(ctl.zones()[0].state(), ZoneState::Error);
        assert_eq!(report.error_indicator, Some(true));
        assert!(ctl.zone_error());
        assert_eq!(report.mode, UnitMode::Idle);
        assert_eq!(ctl.zones()[0].damper(), DamperPosition::Closed);
        assert!(report.events.contains(&ControlEvent::EquipmentLockout));

        // Fault clears on the first clean tick
        let report = ctl.tick(30_000, &[heat(), heat()]);
        assert_eq!(ctl.zones()[0].error_count(), 0);
        assert_eq!(report.error_indicator, Some(false));
        assert_eq!(report.mode, UnitMode::HeatingStage1);
    }

    #[test]
    fn test_heating_beats_cooling() {
        let mut ctl = controller(2);
        let report = ctl.tick(0, &[heat(), cool()]);

        assert_eq!(ctl.zones()[0].state(), ZoneState::HeatingStage1);
        assert_eq!(ctl.zones()[1].state(), ZoneState::Wait);
        assert_eq!(report.mode, UnitMode::HeatingStage1);
        assert_eq!(ctl.zones()[0].damper(), DamperPosition::Open);
        assert_eq!(ctl.zones()[1].damper(), DamperPosition::Closed);
        assert_eq!(report.dampers.len(), 2);
        assert_eq!(report.dampers[1].offset_ms, 100);
    }

    #[test]
    fn test_waiting_zone_runs_after_heating_purge() {
        let mut ctl = controller(2);
        ctl.tick(0, &[heat(), cool()]);

        ctl.tick(MIN_CYCLE, &[idle(), cool()]);
        assert_eq!(ctl.zones()[0].state(), ZoneState::Purge);
        assert_eq!(ctl.zones()[1].state(), ZoneState::Wait);
        assert_eq!(ctl.mode(), UnitMode::PurgeHeating);

        let report = ctl.tick(MIN_CYCLE + PURGE, &[idle(), cool()]);
        assert_eq!(ctl.zones()[1].state(), ZoneState::CoolingStage1);
        assert_eq!(report.mode, UnitMode::CoolingStage1);
        assert_eq!(
            ctl.zones()[1].active_start_ms(),
            Some(MIN_CYCLE + PURGE)
        );
    }

    #[test]
    fn test_stage2_escalation() {
        let mut ctl = controller(1);
        ctl.tick(0, &[heat()]);
        assert_eq!(ctl.mode(), UnitMode::HeatingStage1);

        let report = ctl.tick(HOUR - 10_000, &[heat()]);
        assert_eq!(report.mode_change, None);

        let report = ctl.tick(HOUR, &[heat()]);
        assert_eq!(report.mode, UnitMode::HeatingStage2);
        assert!(report.outputs().is_some_and(|o| o.y2));

        let report = ctl.tick(HOUR + 10_000, &[heat()]);
        assert_eq!(report.mode_change, None);
        assert_eq!(report.mode, UnitMode::HeatingStage2);
    }

    #[test]
    fn test_zone_stage2_call_drives_stage2() {
        let heat2 = DemandSignals::new(false, true, true, true);
        let cool2 = DemandSignals::new(true, true, true, false);

        let mut ctl = controller(1);
        let report = ctl.tick(0, &[heat2]);
        assert_eq!(ctl.zones()[0].state(), ZoneState::HeatingStage2);
        assert_eq!(report.mode, UnitMode::HeatingStage2);
        assert!(report.outputs().is_some_and(|o| o.y1 && o.y2 && !o.ob));
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, ControlEvent::Stage1Armed { .. })));

        let mut ctl = controller(1);
        let report = ctl.tick(0, &[cool2]);
        assert_eq!(ctl.zones()[0].state(), ZoneState::CoolingStage2);
        assert_eq!(report.mode, UnitMode::CoolingStage2);
        assert!(report.outputs().is_some_and(|o| o.y1 && o.y2 && o.ob));
    }

    #[test]
    fn test_stage2_from_any_zone_of_winning_kind() {
        let heat2 = DemandSignals::new(false, true, true, true);

        let mut ctl = controller(3);
        let report = ctl.tick(0, &[heat(), heat2, cool()]);
        assert_eq!(report.mode, UnitMode::HeatingStage2);
        assert_eq!(ctl.zones()[2].state(), ZoneState::Wait);

        // Stage-2 zone satisfied: drop to stage 1 and start the timer there
        let report = ctl.tick(MIN_CYCLE, &[heat(), heat(), cool()]);
        assert_eq!(report.mode, UnitMode::HeatingStage1);
        assert!(report
            .events
            .contains(&ControlEvent::Stage1Armed { escalation_ms: HOUR }));
    }

    #[test]
    fn test_unchanged_snapshot_is_idempotent() {
        let mut ctl = controller(3);
        let demands = [heat(), idle(), DemandSignals::new(false, false, true, false)];
        ctl.tick(0, &demands);

        let report = ctl.tick(10_000, &demands);
        assert!(report.dampers.is_empty());
        assert!(report.transitions.is_empty());
        assert_eq!(report.mode_change, None);
    }

    #[test]
    fn test_manual_mode_freezes_unit() {
        let mut ctl = controller(1);
        ctl.set_auto_mode(false);

        let report = ctl.tick(0, &[heat()]);
        assert_eq!(report.mode_change, None);
        assert_eq!(report.mode, UnitMode::Idle);
        // Zones and dampers still run
        assert_eq!(ctl.zones()[0].state(), ZoneState::HeatingStage1);
        assert_eq!(report.dampers.len(), 1);

        ctl.set_auto_mode(true);
        let report = ctl.tick(10_000, &[heat()]);
        assert_eq!(report.mode, UnitMode::HeatingStage1);
    }

    #[test]
    fn test_manual_mode_leaves_error_lamp() {
        let mut ctl = controller(1);
        ctl.set_auto_mode(false);

        ctl.tick(0, &[no_fan()]);
        let report = ctl.tick(10_000, &[no_fan()]);
        assert!(ctl.zone_error());
        assert_eq!(report.error_indicator, None);
        assert_eq!(report.mode_change, None);

        ctl.set_auto_mode(true);
        let report = ctl.tick(20_000, &[no_fan()]);
        assert_eq!(report.error_indicator, Some(true));
    }

    #[test]
    fn test_no_zones_skips_tick() {
        let mut ctl = controller(0);
        let report = ctl.tick(0, &[]);
        assert!(report.is_skipped());
        assert!(report.dampers.is_empty());
    }

    #[test]
    fn test_zone_index_errors() {
        let mut ctl = controller(2);
        assert_eq!(
            ctl.set_zone_enabled(2, false),
            Err(ZoneIndexError { index: 2, limit: 2 })
        );
        assert!(ctl.zone(5).is_err());
        assert!(ZoningController::new(MAX_ZONES + 1, TimingConfig::default()).is_err());
    }

    #[test]
    fn test_disabled_zone_skipped() {
        let mut ctl = controller(2);
        ctl.set_zone_enabled(1, false).unwrap();

        let report = ctl.tick(0, &[idle(), no_fan()]);
        ctl.tick(10_000, &[idle(), no_fan()]);
        assert!(!ctl.zone_error());
        assert_eq!(ctl.zones()[1].error_count(), 0);
        assert_eq!(report.dampers.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let mut config = ControllerConfig::new();
        let _ = config.zones.push(ZoneHwConfig::named("up"));
        let mut down = ZoneHwConfig::named("down");
        down.enabled = false;
        let _ = config.zones.push(down);
        config.auto_mode = false;

        let ctl = ZoningController::from_config(&config);
        assert_eq!(ctl.zone_count(), 2);
        assert!(!ctl.zones()[1].is_enabled());
        assert!(!ctl.auto_mode());
    }

    #[test]
    fn test_missing_demand_reads_idle() {
        let mut ctl = controller(2);
        let report = ctl.tick(0, &[cool()]);
        assert_eq!(ctl.zones()[1].state(), ZoneState::Off);
        assert_eq!(report.global_max_priority, 2);
    }
}
