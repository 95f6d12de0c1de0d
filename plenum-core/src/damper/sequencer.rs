//! Two-phase damper relay sequencing
//!
//! Every damper motor has an open relay and a close relay. A move is two
//! timed phases:
//!
//! 1. At the command offset, release both relays.
//! 2. `release_ms` later, energize the relay for the commanded direction.
//!
//! Each zone has one release slot and one drive slot. A newer command for
//! the same zone re-arms both, so a pending drive in the old direction can
//! never fire after it. Together with the release phase this keeps the two
//! relays of a damper from ever being on at the same time.
//!
//! # Usage
//!
//! ```ignore
//! let mut seq = DamperSequencer::new(timing.damper_release_ms);
//! for cmd in report.dampers.iter() {
//!     seq.command(*cmd, now_ms);
//! }
//!
//! // Whenever the next phase is due:
//! for action in seq.poll(now_ms) {
//!     relays[action.zone as usize].apply(action.phase)?;
//! }
//! ```

use heapless::Vec;

use super::deferred::Deferred;
use super::{DamperCommand, DamperPosition};
use crate::config::MAX_ZONES;

/// Relay work for one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayPhase {
    /// Both relays off
    Release,
    /// Drive toward the given position
    Energize(DamperPosition),
}

/// A relay phase that became due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayAction {
    pub zone: u8,
    pub phase: RelayPhase,
}

/// Commanded state of one damper's relays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayPair {
    pub open: bool,
    pub close: bool,
}

impl RelayPair {
    /// Relay levels after applying a phase
    ///
    /// Energizing `Unknown` is treated as a release.
    pub const fn after(phase: RelayPhase) -> Self {
        match phase {
            RelayPhase::Energize(DamperPosition::Open) => Self {
                open: true,
                close: false,
            },
            RelayPhase::Energize(DamperPosition::Closed) => Self {
                open: false,
                close: true,
            },
            RelayPhase::Release | RelayPhase::Energize(DamperPosition::Unknown) => Self {
                open: false,
                close: false,
            },
        }
    }

    /// Both relays on: never valid
    pub const fn is_shorted(&self) -> bool {
        self.open && self.close
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DamperChannel {
    release: Deferred<()>,
    drive: Deferred<DamperPosition>,
    relays: RelayPair,
}

/// Timed relay phases for every zone damper
#[derive(Debug, Clone)]
pub struct DamperSequencer {
    release_ms: u64,
    channels: [DamperChannel; MAX_ZONES],
}

impl DamperSequencer {
    /// Create a sequencer with the given release-to-drive gap
    pub fn new(release_ms: u64) -> Self {
        Self {
            release_ms,
            channels: [DamperChannel::default(); MAX_ZONES],
        }
    }

    /// Schedule a damper move issued at `now_ms`
    ///
    /// Returns true if it superseded a move still in progress. Commands for
    /// zones outside the channel range are ignored.
    pub fn command(&mut self, cmd: DamperCommand, now_ms: u64) -> bool {
        let Some(channel) = self.channels.get_mut(cmd.zone as usize) else {
            return false;
        };

        let release_at = now_ms.saturating_add(cmd.offset_ms);
        let drive_at = release_at.saturating_add(self.release_ms);

        let released = channel.release.arm(release_at, ());
        let driven = channel.drive.arm(drive_at, cmd.position);
        released || driven
    }

    /// Fire every phase due at `now_ms`
    ///
    /// Within a zone the release always comes out before the drive.
    pub fn poll(&mut self, now_ms: u64) -> Vec<RelayAction, { 2 * MAX_ZONES }> {
        let mut actions = Vec::new();

        for (zone, channel) in self.channels.iter_mut().enumerate() {
            if channel.release.take_due(now_ms).is_some() {
                channel.relays = RelayPair::after(RelayPhase::Release);
                let _ = actions.push(RelayAction {
                    zone: zone as u8,
                    phase: RelayPhase::Release,
                });
            }

            // A drive never overtakes a release still pending in the same
            // channel.
            if channel.release.is_armed() {
                continue;
            }

            if let Some(position) = channel.drive.take_due(now_ms) {
                let phase = RelayPhase::Energize(position);
                channel.relays = RelayPair::after(phase);
                let _ = actions.push(RelayAction {
                    zone: zone as u8,
                    phase,
                });
            }
        }

        actions
    }

    /// Earliest pending phase across all zones
    pub fn next_due(&self) -> Option<u64> {
        self.channels
            .iter()
            .flat_map(|c| [c.release.due_at(), c.drive.due_at()])
            .flatten()
            .min()
    }

    /// Commanded relay levels for a zone
    pub fn relays(&self, zone: u8) -> Option<RelayPair> {
        self.channels.get(zone as usize).map(|c| c.relays)
    }
}
