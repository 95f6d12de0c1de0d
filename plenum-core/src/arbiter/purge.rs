//! Post-demand purge
//!
//! When the last zone of a thermal kind stops calling, the blower keeps
//! running for a while to clear conditioned air out of the ductwork. A zone
//! that stops while a sibling of the same kind is still running goes
//! straight to off: the equipment keeps going for the sibling anyway.

use crate::config::TimingConfig;
use crate::state::{ControlEvent, EventLog, ThermalKind, ZoneState};
use crate::zone::Zone;

/// Active zones per thermal kind in the working states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveCounts {
    pub heating: usize,
    pub cooling: usize,
}

impl ActiveCounts {
    pub fn of(zones: &[Zone]) -> Self {
        let mut counts = Self::default();
        for zone in zones.iter().filter(|z| z.is_enabled()) {
            match zone.state_new().thermal_kind() {
                Some(ThermalKind::Heating) => counts.heating += 1,
                Some(ThermalKind::Cooling) => counts.cooling += 1,
                None => {}
            }
        }
        counts
    }

    pub fn get(&self, kind: ThermalKind) -> usize {
        match kind {
            ThermalKind::Heating => self.heating,
            ThermalKind::Cooling => self.cooling,
        }
    }
}

/// Arm, enforce and expire purge windows
///
/// Counts are taken once, before any zone in this pass is changed.
pub fn manage(zones: &mut [Zone], now_ms: u64, timing: &TimingConfig, events: &mut EventLog) {
    let counts = ActiveCounts::of(zones);

    for zone in zones.iter_mut().filter(|z| z.is_enabled()) {
        let index = zone.index();
        let was = zone.state();
        let next = zone.state_new();

        if was.is_active() && !next.is_active() && !next.is_error() {
            if zone.within_min_cycle(now_ms, timing.min_cycle_ms) {
                zone.hold();
                let _ = events.push(ControlEvent::PurgeDeferred { zone: index });
            } else if was
                .thermal_kind()
                .is_some_and(|kind| counts.get(kind) > 0)
            {
                zone.override_inactive(ZoneState::Off);
                let _ = events.push(ControlEvent::PurgeSkipped { zone: index });
            } else {
                zone.override_inactive(next);
                zone.arm_purge(now_ms.saturating_add(timing.purge_ms));
                let _ = events.push(ControlEvent::PurgeStarted {
                    zone: index,
                    duration_ms: timing.purge_ms,
                });
            }
        }

        match zone.purge_end_ms() {
            Some(end) if end > now_ms => {
                if !zone.state_new().is_error() {
                    zone.override_inactive(ZoneState::Purge);
                }
            }
            Some(_) => {
                zone.clear_purge();
                let _ = events.push(ControlEvent::PurgeComplete { zone: index });
            }
            None => {}
        }
    }
}
