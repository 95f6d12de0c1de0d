//! Build script for plenum-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates zoning.toml at compile time

use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Must match plenum_core::config::MAX_ZONES
const MAX_ZONES: usize = 6;

/// RP2040 exposes GPIO0-GPIO29
const GPIO_COUNT: u32 = 30;

const ZONE_PIN_KEYS: [&str; 6] = ["y1", "y2", "g", "ob", "damper_open", "damper_close"];
const OUTPUT_KEYS: [&str; 7] = ["y1", "y2", "g", "ob", "w1e", "w2", "w3"];
const INDICATOR_KEYS: [&str; 4] = ["heat", "cool", "fan", "error"];
const DURATION_KEYS: [&str; 6] = [
    "min_cycle_time",
    "purge_duration",
    "stage2_escalation_delay",
    "update_interval",
    "damper_release",
    "damper_stagger",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate zoning.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=zoning.toml");

    let config_path = Path::new("zoning.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: zoning.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds its zone and output bindings from           ║\n\
            ║  zoning.toml in the plenum-firmware directory.                   ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read zoning.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in zoning.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    let mut claimed: HashMap<u32, String> = HashMap::new();

    validate_controller(&config, &mut errors, &mut claimed);
    validate_zones(&config, &mut errors, &mut claimed);
    validate_pin_table(&config, "outputs", &OUTPUT_KEYS, &mut errors, &mut claimed);
    validate_pin_table(&config, "indicators", &INDICATOR_KEYS, &mut errors, &mut claimed);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid zoning configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=zoning.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse "gpioN" with optional `!` and `^` prefixes into its GPIO number
fn pin_number(value: &str) -> Option<u32> {
    let digits = value.trim_start_matches(['!', '^']).strip_prefix("gpio")?;
    let pin: u32 = digits.parse().ok()?;
    (pin < GPIO_COUNT).then_some(pin)
}

fn duration_is_valid(value: &toml::Value) -> bool {
    match value {
        toml::Value::Integer(ms) => *ms >= 0,
        toml::Value::String(s) => {
            let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
            let (digits, unit) = s.split_at(split);
            !digits.is_empty() && matches!(unit.trim(), "" | "ms" | "s" | "min" | "h")
        }
        _ => false,
    }
}

fn duration_is_zero(value: &toml::Value) -> bool {
    match value {
        toml::Value::Integer(ms) => *ms == 0,
        toml::Value::String(s) => s
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .all(|c| c == '0'),
        _ => false,
    }
}

/// Check one pin binding and claim its GPIO
fn check_pin(
    owner: String,
    value: &toml::Value,
    errors: &mut Vec<String>,
    claimed: &mut HashMap<u32, String>,
) {
    let Some(text) = value.as_str() else {
        errors.push(format!("{} must be a pin string like \"gpio4\"", owner));
        return;
    };

    match pin_number(text) {
        Some(pin) => {
            if let Some(previous) = claimed.get(&pin) {
                errors.push(format!("{} reuses gpio{} from {}", owner, pin, previous));
            } else {
                claimed.insert(pin, owner);
            }
        }
        None => errors.push(format!("{} has invalid pin '{}'", owner, text)),
    }
}

/// Validate [controller] timings and the auto-mode switch
fn validate_controller(
    config: &toml::Value,
    errors: &mut Vec<String>,
    claimed: &mut HashMap<u32, String>,
) {
    let controller = match config.get("controller") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[controller] must be a table".to_string());
            return;
        }
        None => return,
    };

    for key in DURATION_KEYS {
        if let Some(value) = controller.get(key) {
            if !duration_is_valid(value) {
                errors.push(format!(
                    "[controller] {} must be a duration (ms, s, min, h)",
                    key
                ));
            }
        }
    }

    if controller.get("update_interval").is_some_and(duration_is_zero) {
        errors.push("[controller] update_interval must be non-zero".to_string());
    }

    if let Some(value) = controller.get("auto_mode") {
        if !value.is_bool() {
            errors.push("[controller] auto_mode must be true or false".to_string());
        }
    }

    if let Some(pin) = controller.get("auto_mode_pin") {
        check_pin("[controller] auto_mode_pin".to_string(), pin, errors, claimed);
    }
}

/// Validate [zone.*] sections: at least one, at most MAX_ZONES
fn validate_zones(
    config: &toml::Value,
    errors: &mut Vec<String>,
    claimed: &mut HashMap<u32, String>,
) {
    let zones = match config.get("zone") {
        Some(toml::Value::Table(t)) => t,
        _ => {
            errors.push("Missing [zone.*] section - at least one zone is required".to_string());
            return;
        }
    };

    if zones.is_empty() {
        errors.push("Missing [zone.*] section - at least one zone is required".to_string());
    }
    if zones.len() > MAX_ZONES {
        errors.push(format!(
            "{} zones configured, at most {} are supported",
            zones.len(),
            MAX_ZONES
        ));
    }

    for (name, zone) in zones {
        let zone = match zone {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[zone.{}] must be a table", name));
                continue;
            }
        };

        if name.len() > 16 {
            errors.push(format!("[zone.{}] name longer than 16 characters", name));
        }

        for key in ZONE_PIN_KEYS {
            if let Some(pin) = zone.get(key) {
                check_pin(format!("[zone.{}] {}", name, key), pin, errors, claimed);
            }
        }

        if zone.contains_key("damper_open") != zone.contains_key("damper_close") {
            errors.push(format!(
                "[zone.{}] needs both damper_open and damper_close",
                name
            ));
        }

        if let Some(value) = zone.get("enabled") {
            if !value.is_bool() {
                errors.push(format!("[zone.{}] enabled must be true or false", name));
            }
        }
    }
}

/// Validate a flat table of pin bindings ([outputs], [indicators])
fn validate_pin_table(
    config: &toml::Value,
    section: &str,
    keys: &[&str],
    errors: &mut Vec<String>,
    claimed: &mut HashMap<u32, String>,
) {
    let table = match config.get(section) {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push(format!("[{}] must be a table", section));
            return;
        }
        None => return,
    };

    for (key, value) in table {
        if !keys.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown output '{}'", section, key));
            continue;
        }
        check_pin(format!("[{}] {}", section, key), value, errors, claimed);
    }
}
