//! Minimal TOML parser for the zoning configuration
//!
//! Handles only the subset needed for a zoning controller and allocates
//! nothing, so it runs the same on the host and on the target.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean, duration)
//! - [section] headers
//! - [zone.name] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys outside section headers
//!
//! Example:
//!
//! ```toml
//! [controller]
//! min_cycle_time = "8min"
//! purge_duration = "5min"
//! auto_mode = true
//!
//! [zone.upstairs]
//! y1 = "gpio2"
//! g = "gpio4"
//! damper_open = "!gpio8"
//! ```

use heapless::String as HString;

use super::hardware::{ControllerConfig, PinConfig, UnitHwConfig, ZoneHwConfig};
use super::types::{TimingConfig, MAX_LABEL_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Invalid duration string or overflow
    InvalidDuration,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Two zone sections share a name
    DuplicateZone,
}

/// Current parsing context
#[derive(Debug, Clone, PartialEq)]
enum Section {
    Root,
    Controller,
    Zone,
    Outputs,
    Indicators,
}

/// Parse TOML configuration into ControllerConfig
pub fn parse_config(input: &str) -> Result<ControllerConfig, ParseError> {
    let mut config = ControllerConfig::new();
    let mut section = Section::Root;
    let mut current_zone: Option<ZoneHwConfig> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            save_zone(&mut config, &mut current_zone)?;

            let (next, zone_name) = parse_section_header(&line[1..line.len() - 1])?;
            if let Some(name) = zone_name {
                if config.find_zone(name.as_str()).is_some() {
                    return Err(ParseError::DuplicateZone);
                }
                let mut zone = ZoneHwConfig::default();
                zone.name = name;
                zone.enabled = true;
                current_zone = Some(zone);
            }
            section = next;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            match section {
                Section::Root => apply_root(key, value, &mut config)?,
                Section::Controller => apply_controller(key, value, &mut config)?,
                Section::Zone => {
                    if let Some(zone) = current_zone.as_mut() {
                        apply_zone(key, value, zone)?;
                    }
                }
                Section::Outputs => apply_output(key, value, &mut config.unit)?,
                Section::Indicators => apply_indicator(key, value, &mut config.unit)?,
            }
        }
    }

    save_zone(&mut config, &mut current_zone)?;

    Ok(config)
}

/// Parse a section header, returning the zone name for `zone.<name>`
fn parse_section_header(
    header: &str,
) -> Result<(Section, Option<HString<MAX_LABEL_LEN>>), ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        let name = name.trim();
        if kind.trim() != "zone" || name.is_empty() || name.contains('.') {
            return Err(ParseError::InvalidSection);
        }
        let name = HString::try_from(name).map_err(|_| ParseError::InvalidSection)?;
        return Ok((Section::Zone, Some(name)));
    }

    match header {
        "controller" => Ok((Section::Controller, None)),
        "outputs" => Ok((Section::Outputs, None)),
        "indicators" => Ok((Section::Indicators, None)),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
pub fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    // Modifiers may appear in any order
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let digits = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = digits.parse().map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

/// Parse a duration into milliseconds
///
/// Accepts `ms`, `s`, `min` and `h` suffixes; a bare number is milliseconds.
pub fn parse_duration_ms(value: &str) -> Result<u64, ParseError> {
    let s = parse_string(value).trim();

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(ParseError::InvalidDuration);
    }

    let amount: u64 = digits.parse().map_err(|_| ParseError::InvalidDuration)?;
    let scale: u64 = match unit.trim() {
        "" | "ms" => 1,
        "s" => 1_000,
        "min" => 60_000,
        "h" => 3_600_000,
        _ => return Err(ParseError::InvalidDuration),
    };

    amount.checked_mul(scale).ok_or(ParseError::InvalidDuration)
}

fn apply_root(key: &str, value: &str, config: &mut ControllerConfig) -> Result<(), ParseError> {
    if key == "version" {
        config.version = parse_int(value)?;
    }
    Ok(())
}

fn apply_controller(
    key: &str,
    value: &str,
    config: &mut ControllerConfig,
) -> Result<(), ParseError> {
    let timing: &mut TimingConfig = &mut config.timing;
    match key {
        "version" => config.version = parse_int(value)?,
        "min_cycle_time" => timing.min_cycle_ms = parse_duration_ms(value)?,
        "purge_duration" => timing.purge_ms = parse_duration_ms(value)?,
        "stage2_escalation_delay" => timing.stage2_escalation_ms = parse_duration_ms(value)?,
        "update_interval" => timing.update_interval_ms = parse_duration_ms(value)?,
        "damper_release" => timing.damper_release_ms = parse_duration_ms(value)?,
        "damper_stagger" => timing.damper_stagger_ms = parse_duration_ms(value)?,
        "auto_mode" => config.auto_mode = parse_bool(value)?,
        "auto_mode_pin" => config.auto_mode_pin = Some(parse_pin(value)?),
        _ => {}
    }
    Ok(())
}

fn apply_zone(key: &str, value: &str, zone: &mut ZoneHwConfig) -> Result<(), ParseError> {
    match key {
        "y1" => zone.y1 = Some(parse_pin(value)?),
        "y2" => zone.y2 = Some(parse_pin(value)?),
        "g" => zone.g = Some(parse_pin(value)?),
        "ob" => zone.ob = Some(parse_pin(value)?),
        "damper_open" => zone.damper_open = Some(parse_pin(value)?),
        "damper_close" => zone.damper_close = Some(parse_pin(value)?),
        "enabled" => zone.enabled = parse_bool(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_output(key: &str, value: &str, unit: &mut UnitHwConfig) -> Result<(), ParseError> {
    let pin = Some(parse_pin(value)?);
    match key {
        "y1" => unit.y1 = pin,
        "y2" => unit.y2 = pin,
        "g" => unit.g = pin,
        "ob" => unit.ob = pin,
        "w1e" => unit.w1e = pin,
        "w2" => unit.w2 = pin,
        "w3" => unit.w3 = pin,
        _ => {}
    }
    Ok(())
}

fn apply_indicator(key: &str, value: &str, unit: &mut UnitHwConfig) -> Result<(), ParseError> {
    let pin = Some(parse_pin(value)?);
    match key {
        "heat" => unit.heat_led = pin,
        "cool" => unit.cool_led = pin,
        "fan" => unit.fan_led = pin,
        "error" => unit.error_led = pin,
        _ => {}
    }
    Ok(())
}

/// Save the zone being built when its section ends
fn save_zone(
    config: &mut ControllerConfig,
    current_zone: &mut Option<ZoneHwConfig>,
) -> Result<(), ParseError> {
    if let Some(zone) = current_zone.take() {
        config
            .zones
            .push(zone)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}
