//! Plenum - Multi-Zone HVAC Damper Controller Firmware
//!
//! Main firmware binary for RP2040-based relay boards. Pin assignments,
//! zone count and timings come from zoning.toml, embedded at build time.
//!
//! Task layout:
//! - controller: samples thermostats, runs the zoning tick, drives the unit
//! - damper: plays out timed relay phases for every zone damper

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Output};
use embassy_time::Timer;
use heapless::Vec;
use {defmt_rtt as _, panic_probe as _};

use plenum_core::config::{ControllerConfig, PinConfig, ZoneHwConfig};
use plenum_core::ZoningController;
use plenum_drivers::{EquipmentBank, GpioRelay, InputLine, RelayDamper, ThermostatInputs};

use crate::channels::MODE_SIGNAL;
use crate::pins::PinBank;
use crate::tasks::{ControllerIo, DamperBank};

/// Embedded zoning configuration (compiled into firmware)
/// Edit zoning.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../zoning.toml");

mod channels;
mod config;
mod pins;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Plenum firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let zoning = config::load_embedded(EMBEDDED_CONFIG);
    config::dump(&zoning);

    let mut bank = PinBank::new(p);

    let controller = ZoningController::from_config(&zoning);
    let io = bind_controller_io(&mut bank, &zoning);
    let dampers = bind_dampers(&mut bank, &zoning);

    info!("Hardware bound, {} zones", controller.zone_count());

    spawner
        .spawn(tasks::damper_task(dampers, zoning.timing.damper_release_ms))
        .unwrap();
    spawner
        .spawn(tasks::controller_task(controller, io))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Mirror mode changes into the log; otherwise just a heartbeat
    loop {
        match select(MODE_SIGNAL.wait(), Timer::after_secs(60)).await {
            Either::First(mode) => debug!("Mode indicator: {}", mode.label()),
            Either::Second(()) => trace!("Main loop heartbeat"),
        }
    }
}

fn bind_input(bank: &mut PinBank, pin: Option<PinConfig>) -> Option<InputLine<Input<'static>>> {
    let config = pin?;
    match bank.input(&config) {
        Ok(input) => Some(InputLine::from_config(input, &config)),
        Err(e) => {
            error!("Input gpio{} not bound: {:?}", config.pin, e);
            None
        }
    }
}

fn bind_relay(bank: &mut PinBank, pin: Option<PinConfig>) -> Option<GpioRelay<Output<'static>>> {
    let config = pin?;
    match bank.output(&config) {
        Ok(output) => GpioRelay::new(output, config.inverted).ok(),
        Err(e) => {
            error!("Output gpio{} not bound: {:?}", config.pin, e);
            None
        }
    }
}

fn bind_thermostat(bank: &mut PinBank, zone: &ZoneHwConfig) -> Option<ThermostatInputs<Input<'static>>> {
    let y1 = bind_input(bank, zone.y1);
    let y2 = bind_input(bank, zone.y2);
    let g = bind_input(bank, zone.g);
    let ob = bind_input(bank, zone.ob);

    if y1.is_none() && y2.is_none() && g.is_none() && ob.is_none() {
        return None;
    }
    Some(ThermostatInputs::new(y1, y2, g, ob))
}

fn bind_controller_io(bank: &mut PinBank, zoning: &ControllerConfig) -> ControllerIo {
    let mut thermostats = Vec::new();
    for zone in zoning.zones.iter() {
        let _ = thermostats.push(bind_thermostat(bank, zone));
    }

    let u = &zoning.unit;
    let equipment = EquipmentBank {
        y1: bind_relay(bank, u.y1),
        y2: bind_relay(bank, u.y2),
        g: bind_relay(bank, u.g),
        ob: bind_relay(bank, u.ob),
        w1e: bind_relay(bank, u.w1e),
        w2: bind_relay(bank, u.w2),
        w3: bind_relay(bank, u.w3),
        heat_led: bind_relay(bank, u.heat_led),
        cool_led: bind_relay(bank, u.cool_led),
        fan_led: bind_relay(bank, u.fan_led),
        error_led: bind_relay(bank, u.error_led),
    };

    ControllerIo {
        thermostats,
        equipment,
        auto_switch: bind_input(bank, zoning.auto_mode_pin),
    }
}

fn bind_dampers(bank: &mut PinBank, zoning: &ControllerConfig) -> DamperBank {
    let mut dampers = Vec::new();
    for (index, zone) in zoning.zones.iter().enumerate() {
        let open = bind_relay(bank, zone.damper_open);
        let close = bind_relay(bank, zone.damper_close);
        let damper = match (open, close) {
            (Some(open), Some(close)) => Some(RelayDamper::new(open, close)),
            (None, None) => None,
            _ => {
                warn!("Zone {}: damper needs both relays, ignoring", index + 1);
                None
            }
        };
        let _ = dampers.push(damper);
    }
    dampers
}
