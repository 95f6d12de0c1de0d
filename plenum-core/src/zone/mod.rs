//! Per-zone runtime data and single-zone passes
//!
//! A zone owns its committed state, the working state for the current
//! tick, the fault debounce counter and its timers. The cross-zone passes
//! live in [`crate::arbiter`]; everything here looks at one zone only.

use crate::damper::DamperPosition;
use crate::state::{ControlEvent, DemandSignals, EventLog, Transition, ZoneState};

/// Consecutive stage-without-fan ticks that confirm a fault
pub const ERROR_CONFIRM_TICKS: u8 = 2;

/// Runtime data for one zone
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Zone {
    index: u8,
    /// Committed state from the last tick
    state: ZoneState,
    /// Working state for the tick in progress
    state_new: ZoneState,
    error_count: u8,
    damper: DamperPosition,
    purge_end_ms: Option<u64>,
    active_start_ms: Option<u64>,
    short_cycle_protection: bool,
    enabled: bool,
}

impl Zone {
    /// Fresh zone: off, timers cleared, damper never commanded
    pub const fn new(index: u8) -> Self {
        Self {
            index,
            state: ZoneState::Off,
            state_new: ZoneState::Off,
            error_count: 0,
            damper: DamperPosition::Unknown,
            purge_end_ms: None,
            active_start_ms: None,
            short_cycle_protection: false,
            enabled: true,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    pub fn state_new(&self) -> ZoneState {
        self.state_new
    }

    pub fn error_count(&self) -> u8 {
        self.error_count
    }

    pub fn damper(&self) -> DamperPosition {
        self.damper
    }

    pub fn purge_end_ms(&self) -> Option<u64> {
        self.purge_end_ms
    }

    pub fn active_start_ms(&self) -> Option<u64> {
        self.active_start_ms
    }

    pub fn short_cycle_protection(&self) -> bool {
        self.short_cycle_protection
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the zone
    ///
    /// Disabling drops the zone back to a clean off state; the damper keeps
    /// its last position.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            let damper = self.damper;
            *self = Self::new(self.index);
            self.damper = damper;
        }
        self.enabled = enabled;
    }

    pub(crate) fn set_damper(&mut self, position: DamperPosition) {
        self.damper = position;
    }

    /// Time spent in the current active run
    pub fn active_elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.active_start_ms.map(|start| now_ms.saturating_sub(start))
    }

    /// True while the current run is shorter than `min_cycle_ms`
    pub fn within_min_cycle(&self, now_ms: u64, min_cycle_ms: u64) -> bool {
        self.active_elapsed_ms(now_ms)
            .is_some_and(|elapsed| elapsed < min_cycle_ms)
    }

    /// Derive this tick's working state from the thermostat signals
    ///
    /// A stage called without the fan is counted; on the second consecutive
    /// tick the zone goes to `Error` and nothing else is evaluated. A clean
    /// tick resets the counter.
    pub fn calc_state(&mut self, demand: DemandSignals, events: &mut EventLog) {
        self.state_new = ZoneState::Off;

        if demand.stage_without_fan() {
            self.error_count = self
                .error_count
                .saturating_add(1)
                .min(ERROR_CONFIRM_TICKS);

            if self.error_count >= ERROR_CONFIRM_TICKS {
                self.state_new = ZoneState::Error;
                if !self.state.is_error() {
                    let _ = events.push(ControlEvent::ErrorConfirmed { zone: self.index });
                }
            } else {
                let _ = events.push(ControlEvent::ErrorSuspected {
                    zone: self.index,
                    count: self.error_count,
                });
            }
            return;
        }

        if self.error_count > 0 {
            let _ = events.push(ControlEvent::ErrorCleared {
                zone: self.index,
                count: self.error_count,
            });
            self.error_count = 0;
        }

        self.state_new = demand.requested_state();
    }

    /// Hold an active run open until it has lasted `min_cycle_ms`
    ///
    /// A stop inside the window is deferred, not refused: the working state
    /// keeps the committed active state and the check repeats every tick
    /// against the original start time.
    pub fn apply_short_cycle_protection(
        &mut self,
        now_ms: u64,
        min_cycle_ms: u64,
        events: &mut EventLog,
    ) {
        if self.state_new.is_error() {
            self.clear_cycle();
            return;
        }

        if self.state_new.is_active() {
            if self.active_start_ms.is_none() {
                self.active_start_ms = Some(now_ms);
            }
            self.short_cycle_protection = self.within_min_cycle(now_ms, min_cycle_ms);
            return;
        }

        if self.state.is_active() {
            if self.within_min_cycle(now_ms, min_cycle_ms) {
                self.short_cycle_protection = true;
                if self.state_new == ZoneState::Off {
                    self.state_new = self.state;
                    let _ = events.push(ControlEvent::ShortCycleHold {
                        zone: self.index,
                        elapsed_ms: self.active_elapsed_ms(now_ms).unwrap_or(0),
                        required_ms: min_cycle_ms,
                    });
                }
            } else {
                self.clear_cycle();
            }
            return;
        }

        self.clear_cycle();
    }

    /// Keep the committed active state for another tick
    pub(crate) fn hold(&mut self) {
        self.state_new = self.state;
        self.short_cycle_protection = true;
    }

    /// Override the working state with one that runs no stage
    ///
    /// The zone is no longer running, so its active-run timer stops.
    pub(crate) fn override_inactive(&mut self, state: ZoneState) {
        self.state_new = state;
        self.clear_cycle();
    }

    pub(crate) fn arm_purge(&mut self, end_ms: u64) {
        self.purge_end_ms = Some(end_ms);
    }

    pub(crate) fn clear_purge(&mut self) {
        self.purge_end_ms = None;
    }

    fn clear_cycle(&mut self) {
        self.active_start_ms = None;
        self.short_cycle_protection = false;
    }

    /// Commit the working state
    pub fn commit(&mut self) -> Option<Transition> {
        let from = self.state;
        self.state = self.state_new;
        (from != self.state).then_some(Transition {
            zone: self.index,
            from,
            to: self.state,
        })
    }

    #[cfg(test)]
    pub(crate) fn force_state_new(&mut self, state: ZoneState) {
        self.state_new = state;
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: ZoneState) {
        self.state = state;
        self.state_new = state;
    }
}
