//! Zoning controller task
//!
//! Samples every thermostat on a fixed interval, runs one controller tick,
//! logs what the tick decided and applies it:
//! - equipment outputs and lamps when the mode changes
//! - the error lamp every tick
//! - damper moves via the damper task

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Instant, Ticker};
use heapless::Vec;

use plenum_core::config::MAX_ZONES;
use plenum_core::state::{ControlEvent, DemandSignals, UnitMode};
use plenum_core::traits::{EquipmentOutput, ModeIndicator, ThermostatInput};
use plenum_core::{TickReport, ZoningController};
use plenum_drivers::{EquipmentBank, InputLine, ThermostatInputs};

use crate::channels::{DAMPER_CMD, MODE_SIGNAL};

/// Hardware the controller task owns
pub struct ControllerIo {
    /// Thermostat lines per zone, in zone order; `None` for unwired zones
    pub thermostats: Vec<Option<ThermostatInputs<Input<'static>>>, MAX_ZONES>,
    pub equipment: EquipmentBank<Output<'static>>,
    /// Optional automatic-mode switch
    pub auto_switch: Option<InputLine<Input<'static>>>,
}

/// Mirrors the unit mode onto [`MODE_SIGNAL`]
struct SignalIndicator;

impl ModeIndicator for SignalIndicator {
    fn publish(&mut self, mode: UnitMode) {
        MODE_SIGNAL.signal(mode);
    }
}

/// Zoning controller task
#[embassy_executor::task]
pub async fn controller_task(mut controller: ZoningController, mut io: ControllerIo) {
    info!("Controller task started");

    let interval = controller.timing().update_interval_ms;
    let mut ticker = Ticker::every(Duration::from_millis(interval));
    let mut indicator = SignalIndicator;

    // Outputs start released; make the lamps agree with Idle
    if let Err(e) = io.equipment.apply(&UnitMode::Idle.outputs()) {
        warn!("Failed to apply idle outputs: {:?}", e);
    }
    indicator.publish(controller.mode());

    loop {
        ticker.next().await;

        poll_auto_switch(&mut controller, &mut io);

        let demands = read_thermostats(&mut io);
        let now_ms = Instant::now().as_millis();
        let report = controller.tick(now_ms, &demands);

        log_report(&report);
        apply_report(&report, &mut io, &mut indicator).await;
    }
}

fn poll_auto_switch(controller: &mut ZoningController, io: &mut ControllerIo) {
    let Some(switch) = io.auto_switch.as_mut() else {
        return;
    };

    match switch.is_asserted() {
        Ok(enabled) if enabled != controller.auto_mode() => {
            info!(
                "Automatic mode {}",
                if enabled { "enabled" } else { "disabled" }
            );
            controller.set_auto_mode(enabled);
        }
        Ok(_) => {}
        Err(_) => warn!("Failed to read auto mode switch"),
    }
}

/// Sample every zone; unreadable or unwired zones read as idle
fn read_thermostats(io: &mut ControllerIo) -> Vec<DemandSignals, MAX_ZONES> {
    let mut demands = Vec::new();
    for (index, thermostat) in io.thermostats.iter_mut().enumerate() {
        let demand = match thermostat {
            Some(inputs) => inputs.read().unwrap_or_else(|e| {
                warn!("Zone {}: thermostat read failed: {:?}", index + 1, e);
                DemandSignals::idle()
            }),
            None => DemandSignals::idle(),
        };
        let _ = demands.push(demand);
    }
    demands
}

fn log_event(event: &ControlEvent) {
    match *event {
        ControlEvent::ErrorSuspected { zone, count } => {
            warn!("Zone {}: stage call without fan ({}/2)", zone + 1, count)
        }
        ControlEvent::ErrorConfirmed { zone } => {
            error!("Zone {}: wiring fault confirmed, damper closing", zone + 1)
        }
        ControlEvent::ErrorCleared { zone, count } => {
            info!("Zone {}: fault cleared after {} ticks", zone + 1, count)
        }
        ControlEvent::CycleStarted { zone } => info!("Zone {}: cycle started", zone + 1),
        ControlEvent::ShortCycleHold {
            zone,
            elapsed_ms,
            required_ms,
        } => warn!(
            "Zone {}: short-cycle hold ({} of {} ms)",
            zone + 1,
            elapsed_ms,
            required_ms
        ),
        ControlEvent::PurgeDeferred { zone } => {
            debug!("Zone {}: purge deferred until min cycle", zone + 1)
        }
        ControlEvent::PurgeStarted { zone, duration_ms } => {
            info!("Zone {}: purge for {} ms", zone + 1, duration_ms)
        }
        ControlEvent::PurgeSkipped { zone } => {
            debug!("Zone {}: purge skipped, same kind still active", zone + 1)
        }
        ControlEvent::PurgeComplete { zone } => info!("Zone {}: purge complete", zone + 1),
        ControlEvent::NoZonesConfigured => warn!("No zones configured, tick skipped"),
        ControlEvent::EquipmentLockout => error!("Zone error: central unit locked out"),
        ControlEvent::Stage1Armed { escalation_ms } => {
            info!("Stage 1 running, stage 2 in {} ms", escalation_ms)
        }
        ControlEvent::Stage2Escalated { elapsed_ms } => {
            warn!("Stage 2 escalation after {} ms on stage 1", elapsed_ms)
        }
    }
}

fn log_report(report: &TickReport) {
    for event in report.events.iter() {
        log_event(event);
    }

    for t in report.transitions.iter() {
        info!("Zone {}: {} -> {}", t.zone + 1, t.from.label(), t.to.label());
    }

    if let Some(change) = report.mode_change {
        info!(
            "Mode: {} -> {} (priority {})",
            change.from.label(),
            change.to.label(),
            change.max_priority
        );
    }

    debug!(
        "Tick: mode {}, max priority {}, error lamp {:?}",
        report.mode.label(),
        report.global_max_priority,
        report.error_indicator
    );
}

async fn apply_report(report: &TickReport, io: &mut ControllerIo, indicator: &mut SignalIndicator) {
    if report.is_skipped() {
        return;
    }

    if let Some(pattern) = report.outputs() {
        if let Err(e) = io.equipment.apply(&pattern) {
            error!("Failed to apply {} outputs: {:?}", report.mode.label(), e);
        }
        indicator.publish(report.mode);
    }

    if let Some(on) = report.error_indicator {
        if let Err(e) = io.equipment.set_error_indicator(on) {
            warn!("Failed to drive error lamp: {:?}", e);
        }
    }

    for cmd in report.dampers.iter() {
        DAMPER_CMD.send(*cmd).await;
    }
}
