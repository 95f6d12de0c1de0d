//! Boot-time configuration dump
//!
//! Prints every timing and binding so a wiring mistake shows up in the RTT
//! log before the first tick.

use defmt::*;

use plenum_core::config::{ControllerConfig, PinConfig};

fn log_pin(label: &str, pin: Option<PinConfig>) {
    match pin {
        Some(pin) => {
            let level = if pin.inverted { "active-low" } else { "active-high" };
            let pull = if pin.pull_up { ", pull-up" } else { "" };
            info!("    {}: gpio{} ({}{})", label, pin.pin, level, pull);
        }
        None => info!("    {}: NOT SET", label),
    }
}

/// Log the full configuration
pub fn dump(config: &ControllerConfig) {
    let t = &config.timing;

    info!("=== Plenum configuration ===");
    info!("  Zones: {}", config.zone_count());
    info!("  Min cycle time: {} ms", t.min_cycle_ms);
    info!("  Purge duration: {} ms", t.purge_ms);
    if t.stage2_escalation_ms == 0 {
        info!("  Stage-2 escalation: disabled");
    } else {
        info!("  Stage-2 escalation: {} ms", t.stage2_escalation_ms);
    }
    info!("  Update interval: {} ms", t.update_interval_ms);
    info!(
        "  Damper release/stagger: {}/{} ms",
        t.damper_release_ms, t.damper_stagger_ms
    );
    info!("  Auto mode: {}", config.auto_mode);
    log_pin("auto mode switch", config.auto_mode_pin);

    for (index, zone) in config.zones.iter().enumerate() {
        info!(
            "  Zone {} '{}'{}",
            index + 1,
            zone.name.as_str(),
            if zone.enabled { "" } else { " (disabled)" }
        );
        log_pin("Y1", zone.y1);
        log_pin("Y2", zone.y2);
        log_pin("G", zone.g);
        log_pin("O/B", zone.ob);
        log_pin("damper open", zone.damper_open);
        log_pin("damper close", zone.damper_close);
        if !zone.has_inputs() {
            warn!("  Zone {} is missing thermostat inputs", index + 1);
        }
        if !zone.has_damper() {
            warn!("  Zone {} has no damper relays", index + 1);
        }
    }

    let u = &config.unit;
    info!("  Equipment outputs:");
    log_pin("Y1", u.y1);
    log_pin("Y2", u.y2);
    log_pin("G", u.g);
    log_pin("O/B", u.ob);
    log_pin("W1e", u.w1e);
    log_pin("W2", u.w2);
    log_pin("W3", u.w3);
    info!("  Indicators:");
    log_pin("heat", u.heat_led);
    log_pin("cool", u.cool_led);
    log_pin("fan", u.fan_led);
    log_pin("error", u.error_led);
}
