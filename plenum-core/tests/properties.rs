//! Property tests for the zoning pipeline and damper sequencing.
//!
//! Host-only: drives the controller with arbitrary demand sequences and the
//! sequencer with arbitrary command/poll interleavings.

use plenum_core::config::TimingConfig;
use plenum_core::damper::{DamperCommand, DamperPosition, DamperSequencer, RelayPair};
use plenum_core::state::{DemandSignals, UnitMode, ZoneState};
use plenum_core::zone::ERROR_CONFIRM_TICKS;
use plenum_core::ZoningController;
use proptest::prelude::*;

const TICK_MS: u64 = 10_000;

fn short_timing() -> TimingConfig {
    TimingConfig {
        min_cycle_ms: 30_000,
        purge_ms: 20_000,
        stage2_escalation_ms: 60_000,
        update_interval_ms: TICK_MS,
        ..TimingConfig::default()
    }
}

fn arb_demand() -> impl Strategy<Value = DemandSignals> + Clone {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(y1, y2, g, ob)| DemandSignals::new(y1, y2, g, ob))
}

/// Demand that never calls a stage without the fan
fn arb_wired_demand() -> impl Strategy<Value = DemandSignals> + Clone {
    arb_demand().prop_map(|d| DemandSignals {
        g: d.g || d.y1 || d.y2,
        ..d
    })
}

fn arb_snapshots(
    demand: impl Strategy<Value = DemandSignals> + Clone,
) -> impl Strategy<Value = Vec<Vec<DemandSignals>>> {
    (1usize..=6).prop_flat_map(move |zones| {
        proptest::collection::vec(proptest::collection::vec(demand.clone(), zones), 1..40)
    })
}

// ── Arbitration ───────────────────────────────────────────────

proptest! {
    /// After every tick the reported max priority is the max over enabled
    /// zones, and nothing with a lower positive priority is left running.
    #[test]
    fn lower_priority_demand_always_waits(snapshots in arb_snapshots(arb_demand())) {
        let zones = snapshots[0].len();
        let mut ctl = ZoningController::new(zones, short_timing()).unwrap();

        for (i, demands) in snapshots.iter().enumerate() {
            let report = ctl.tick(i as u64 * TICK_MS, demands);

            let max = ctl.zones().iter().map(|z| z.state().priority()).max().unwrap_or(0);
            prop_assert_eq!(report.global_max_priority, max);

            for zone in ctl.zones() {
                let p = zone.state().priority();
                prop_assert!(
                    p == 0 || p == max,
                    "zone {} left in {:?} below max {}",
                    zone.index(),
                    zone.state(),
                    max
                );
            }
        }
    }

    /// A confirmed fault always shows up as Error that same tick and forces
    /// the unit idle.
    #[test]
    fn confirmed_fault_locks_out(snapshots in arb_snapshots(arb_demand())) {
        let zones = snapshots[0].len();
        let mut ctl = ZoningController::new(zones, short_timing()).unwrap();

        for (i, demands) in snapshots.iter().enumerate() {
            let report = ctl.tick(i as u64 * TICK_MS, demands);

            let mut any_error = false;
            for zone in ctl.zones() {
                if zone.error_count() >= ERROR_CONFIRM_TICKS {
                    prop_assert_eq!(zone.state(), ZoneState::Error);
                    prop_assert_eq!(zone.damper(), DamperPosition::Closed);
                    any_error = true;
                }
                if zone.state() == ZoneState::Error {
                    prop_assert!(zone.error_count() >= ERROR_CONFIRM_TICKS);
                }
            }

            prop_assert_eq!(report.error_indicator, Some(any_error));
            if any_error {
                prop_assert_eq!(report.mode, UnitMode::Idle);
            }
        }
    }

    /// A zone calling stage 2 puts the unit in stage 2 of that kind, and a
    /// stage-1 unit mode never runs beside a stage-2 zone of the same kind.
    #[test]
    fn zone_stage2_call_selects_stage2(snapshots in arb_snapshots(arb_demand())) {
        let zones = snapshots[0].len();
        let mut ctl = ZoningController::new(zones, short_timing()).unwrap();

        for (i, demands) in snapshots.iter().enumerate() {
            let report = ctl.tick(i as u64 * TICK_MS, demands);
            let calls = |state: ZoneState| {
                ctl.zones().iter().any(|z| z.is_enabled() && z.state() == state)
            };

            match report.mode {
                UnitMode::CoolingStage1 => prop_assert!(!calls(ZoneState::CoolingStage2)),
                UnitMode::HeatingStage1 => prop_assert!(!calls(ZoneState::HeatingStage2)),
                _ => {}
            }

            if !ctl.zone_error() {
                if report.global_max_priority == 2 && calls(ZoneState::CoolingStage2) {
                    prop_assert_eq!(report.mode, UnitMode::CoolingStage2);
                }
                if report.global_max_priority == 4 && calls(ZoneState::HeatingStage2) {
                    prop_assert_eq!(report.mode, UnitMode::HeatingStage2);
                }
            }
        }
    }

    /// Re-running a tick on an unchanged snapshot changes nothing.
    #[test]
    fn unchanged_snapshot_is_idempotent(snapshots in arb_snapshots(arb_wired_demand())) {
        let zones = snapshots[0].len();
        let mut ctl = ZoningController::new(zones, short_timing()).unwrap();

        for (i, demands) in snapshots.iter().enumerate() {
            let now = i as u64 * TICK_MS;
            ctl.tick(now, demands);
            let again = ctl.tick(now, demands);

            prop_assert!(again.dampers.is_empty());
            prop_assert!(again.transitions.is_empty());
            prop_assert!(again.mode_change.is_none());
        }
    }

    /// An active run never ends before the minimum cycle time unless the
    /// zone faults or is pre-empted.
    #[test]
    fn active_run_respects_min_cycle(snapshots in arb_snapshots(arb_wired_demand())) {
        let timing = short_timing();
        let zones = snapshots[0].len();
        let mut ctl = ZoningController::new(zones, timing).unwrap();

        for (i, demands) in snapshots.iter().enumerate() {
            let now = i as u64 * TICK_MS;
            let starts: Vec<Option<u64>> =
                ctl.zones().iter().map(|z| z.active_start_ms()).collect();

            let report = ctl.tick(now, demands);

            for t in report.transitions.iter() {
                let stopped = matches!(
                    t.to,
                    ZoneState::Off | ZoneState::Purge | ZoneState::FanOnly
                );
                if t.from.is_active() && stopped {
                    let start = starts[t.zone as usize].unwrap_or(0);
                    prop_assert!(now - start >= timing.min_cycle_ms);
                }
            }
        }
    }
}

// ── Damper relays ─────────────────────────────────────────────

#[derive(Debug, Clone)]
enum RelayOp {
    Command { zone: u8, open: bool, offset_ms: u64 },
    Advance(u64),
}

fn arb_relay_op() -> impl Strategy<Value = RelayOp> {
    prop_oneof![
        (0u8..6, any::<bool>(), 0u64..600).prop_map(|(zone, open, offset_ms)| {
            RelayOp::Command {
                zone,
                open,
                offset_ms,
            }
        }),
        (0u64..500).prop_map(RelayOp::Advance),
    ]
}

proptest! {
    /// Under any interleaving of commands and polls the two relays of one
    /// damper are never energized together.
    #[test]
    fn damper_relays_never_both_on(
        ops in proptest::collection::vec(arb_relay_op(), 1..100),
    ) {
        let mut seq = DamperSequencer::new(250);
        let mut levels = [RelayPair::default(); 6];
        let mut now = 0u64;

        for op in ops {
            match op {
                RelayOp::Command { zone, open, offset_ms } => {
                    let position = if open { DamperPosition::Open } else { DamperPosition::Closed };
                    seq.command(DamperCommand { zone, position, offset_ms }, now);
                }
                RelayOp::Advance(ms) => {
                    now += ms;
                    for action in seq.poll(now) {
                        levels[action.zone as usize] = RelayPair::after(action.phase);
                        prop_assert!(!levels[action.zone as usize].is_shorted());
                    }
                }
            }

            for zone in 0..6u8 {
                let pair = seq.relays(zone).unwrap();
                prop_assert!(!pair.is_shorted());
                prop_assert_eq!(pair, levels[zone as usize]);
            }
        }
    }

    /// The last command for a zone is the one that ends up energized.
    #[test]
    fn last_command_wins(
        commands in proptest::collection::vec((any::<bool>(), 0u64..400), 1..10),
    ) {
        let mut seq = DamperSequencer::new(250);
        let mut now = 0u64;
        let mut last = DamperPosition::Unknown;

        for (open, gap) in commands {
            now += gap;
            last = if open { DamperPosition::Open } else { DamperPosition::Closed };
            seq.command(DamperCommand { zone: 0, position: last, offset_ms: 0 }, now);
            let _ = seq.poll(now);
        }

        let _ = seq.poll(now + 250);
        let pair = seq.relays(0).unwrap();
        prop_assert_eq!(pair.open, last == DamperPosition::Open);
        prop_assert_eq!(pair.close, last == DamperPosition::Closed);
        prop_assert_eq!(seq.next_due(), None);
    }
}
