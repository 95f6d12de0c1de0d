//! Embedded configuration loading
//!
//! zoning.toml is compiled into the image and has already passed the build
//! script's checks, so a parse failure here means the two disagree.

use defmt::*;

use plenum_core::config::{parse_config, ControllerConfig, TimingConfig};

/// Parse the embedded zoning configuration
///
/// Falls back to an empty configuration on error. With no zones every tick
/// is skipped, which leaves all equipment released.
pub fn load_embedded(source: &str) -> ControllerConfig {
    let mut config = match parse_config(source) {
        Ok(config) => {
            info!("Parsed embedded zoning configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Running with no zones configured");
            ControllerConfig::new()
        }
    };

    if config.version != 1 {
        warn!("Config version {} (expected 1)", config.version);
    }

    if !config.timing.is_valid() {
        let fallback = TimingConfig::default().update_interval_ms;
        warn!("update_interval is zero, using {} ms", fallback);
        config.timing.update_interval_ms = fallback;
    }

    config
}
