//! Configuration type definitions
//!
//! Timing and sizing parameters for the controller. These are loaded once at
//! boot; nothing here is persisted.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum zones one controller can drive
pub const MAX_ZONES: usize = 6;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Controller timing
///
/// All durations are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Minimum run time once a zone goes active
    pub min_cycle_ms: u64,
    /// Fan-only run after the last zone of a kind stops
    pub purge_ms: u64,
    /// Stage-1 run time before stage 2 is brought in (0 disables)
    pub stage2_escalation_ms: u64,
    /// Period of the control tick
    pub update_interval_ms: u64,
    /// Gap between releasing both damper relays and driving one
    pub damper_release_ms: u64,
    /// Offset between successive damper commands in one tick
    pub damper_stagger_ms: u64,
}

impl TimingConfig {
    /// Check that the values can drive the controller
    ///
    /// A zero tick interval would spin the control task.
    pub fn is_valid(&self) -> bool {
        self.update_interval_ms > 0
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_cycle_ms: 480_000,
            purge_ms: 300_000,
            stage2_escalation_ms: 3_600_000,
            update_interval_ms: 10_000,
            damper_release_ms: 250,
            damper_stagger_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let t = TimingConfig::default();
        assert_eq!(t.min_cycle_ms, 8 * 60 * 1000);
        assert_eq!(t.purge_ms, 5 * 60 * 1000);
        assert_eq!(t.stage2_escalation_ms, 60 * 60 * 1000);
        assert_eq!(t.update_interval_ms, 10_000);
        assert!(t.is_valid());
    }

    #[test]
    fn test_zero_interval_invalid() {
        let t = TimingConfig {
            update_interval_ms: 0,
            ..TimingConfig::default()
        };
        assert!(!t.is_valid());
    }
}
