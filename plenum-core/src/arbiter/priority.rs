//! Priority arbitration
//!
//! The central unit can only serve one kind of demand at a time. The
//! highest working-state priority across enabled zones wins; every other
//! zone with a real demand waits with its damper closed.
//!
//! Waiting is recomputed from scratch every tick. A zone waits for as long
//! as something with higher priority is running.

use crate::state::ZoneState;
use crate::zone::Zone;

/// Highest working-state priority over enabled zones
pub fn global_max_priority(zones: &[Zone]) -> u8 {
    zones
        .iter()
        .filter(|z| z.is_enabled())
        .map(|z| z.state_new().priority())
        .max()
        .unwrap_or(0)
}

/// Put every lower-priority demand into `Wait`
///
/// Returns the global maximum priority.
pub fn arbitrate(zones: &mut [Zone]) -> u8 {
    let max = global_max_priority(zones);

    for zone in zones.iter_mut().filter(|z| z.is_enabled()) {
        let state = zone.state_new();
        let priority = state.priority();
        if priority > 0 && priority < max && !state.is_error() {
            zone.override_inactive(ZoneState::Wait);
        }
    }

    max
}

/// True if any enabled zone is in `Error` this tick
pub fn any_error(zones: &[Zone]) -> bool {
    zones
        .iter()
        .any(|z| z.is_enabled() && z.state_new().is_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(states: &[ZoneState]) -> heapless::Vec<Zone, 6> {
        let mut out = heapless::Vec::new();
        for (i, s) in states.iter().enumerate() {
            let mut z = Zone::new(i as u8);
            z.force_state_new(*s);
            let _ = out.push(z);
        }
        out
    }

    #[test]
    fn test_heating_beats_cooling() {
        let mut zs = zones(&[ZoneState::HeatingStage1, ZoneState::CoolingStage2]);
        assert_eq!(arbitrate(&mut zs), 4);
        assert_eq!(zs[0].state_new(), ZoneState::HeatingStage1);
        assert_eq!(zs[1].state_new(), ZoneState::Wait);
    }

    #[test]
    fn test_purge_beats_everything() {
        let mut zs = zones(&[
            ZoneState::Purge,
            ZoneState::HeatingStage2,
            ZoneState::FanOnly,
            ZoneState::Off,
        ]);
        assert_eq!(arbitrate(&mut zs), 6);
        assert_eq!(zs[1].state_new(), ZoneState::Wait);
        assert_eq!(zs[2].state_new(), ZoneState::Wait);
        // Off has no demand to defer
        assert_eq!(zs[3].state_new(), ZoneState::Off);
    }

    #[test]
    fn test_equal_priority_runs_together() {
        let mut zs = zones(&[ZoneState::CoolingStage1, ZoneState::CoolingStage2]);
        assert_eq!(arbitrate(&mut zs), 2);
        assert_eq!(zs[0].state_new(), ZoneState::CoolingStage1);
        assert_eq!(zs[1].state_new(), ZoneState::CoolingStage2);
    }

    #[test]
    fn test_error_untouched() {
        let mut zs = zones(&[ZoneState::Error, ZoneState::FanOnly]);
        assert_eq!(arbitrate(&mut zs), 1);
        assert_eq!(zs[0].state_new(), ZoneState::Error);
        assert!(any_error(&zs));
    }

    #[test]
    fn test_disabled_zone_ignored() {
        let mut zs = zones(&[ZoneState::HeatingStage1, ZoneState::FanOnly]);
        zs[0].set_enabled(false);
        assert_eq!(arbitrate(&mut zs), 1);
        assert_eq!(zs[1].state_new(), ZoneState::FanOnly);
    }

    #[test]
    fn test_all_idle() {
        let mut zs = zones(&[ZoneState::Off, ZoneState::Off]);
        assert_eq!(arbitrate(&mut zs), 0);
        assert!(!any_error(&zs));
    }
}
