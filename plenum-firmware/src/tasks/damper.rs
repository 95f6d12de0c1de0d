//! Damper sequencing task
//!
//! Receives damper moves from the controller and plays them out through the
//! core sequencer: release both relays, wait, then drive one. Sleeps until
//! either a new move arrives or the next phase is due.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

use plenum_core::config::MAX_ZONES;
use plenum_core::damper::DamperSequencer;
use plenum_core::traits::DamperActuator;
use plenum_drivers::RelayDamper;

use crate::channels::DAMPER_CMD;

/// Idle wake-up when nothing is scheduled
const IDLE_WAKE: Duration = Duration::from_secs(60);

/// Damper relay pairs per zone, in zone order; `None` for zones without one
pub type DamperBank = Vec<Option<RelayDamper<Output<'static>>>, MAX_ZONES>;

/// Damper sequencing task
#[embassy_executor::task]
pub async fn damper_task(mut dampers: DamperBank, release_ms: u64) {
    info!("Damper task started ({} ms release gap)", release_ms);

    let mut sequencer = DamperSequencer::new(release_ms);

    loop {
        let wake = match sequencer.next_due() {
            Some(due_ms) => Timer::at(Instant::from_millis(due_ms)),
            None => Timer::after(IDLE_WAKE),
        };

        if let Either::First(cmd) = select(DAMPER_CMD.receive(), wake).await {
            let now_ms = Instant::now().as_millis();
            trace!(
                "Zone {}: damper {} in {} ms",
                cmd.zone + 1,
                cmd.position.label(),
                cmd.offset_ms
            );
            if sequencer.command(cmd, now_ms) {
                debug!("Zone {}: damper move superseded", cmd.zone + 1);
            }
        }

        let now_ms = Instant::now().as_millis();
        for action in sequencer.poll(now_ms) {
            let Some(Some(damper)) = dampers.get_mut(action.zone as usize) else {
                continue;
            };
            if let Err(e) = damper.apply(action.phase) {
                error!("Zone {}: damper relay write failed: {:?}", action.zone + 1, e);
            }
        }
    }
}
