//! Zone damper control
//!
//! Each tick the final zone states are mapped to a damper target. Zones
//! whose target differs from the last commanded position get a command,
//! staggered so the relay bus switches one damper at a time. The
//! [`sequencer`] turns each command into timed relay phases.

pub mod deferred;
pub mod sequencer;

use heapless::Vec;

use crate::config::MAX_ZONES;
use crate::state::ZoneState;
use crate::zone::Zone;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use deferred::Deferred;
pub use sequencer::{DamperSequencer, RelayAction, RelayPair, RelayPhase};

/// Last commanded damper position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DamperPosition {
    /// Never commanded (boot)
    #[default]
    Unknown,
    Open,
    Closed,
}

impl DamperPosition {
    pub const fn label(&self) -> &'static str {
        match self {
            DamperPosition::Unknown => "unknown",
            DamperPosition::Open => "open",
            DamperPosition::Closed => "closed",
        }
    }
}

/// Move one damper, starting `offset_ms` after the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DamperCommand {
    pub zone: u8,
    pub position: DamperPosition,
    pub offset_ms: u64,
}

/// Damper target for a zone's final state
///
/// With nothing calling anywhere every damper opens so the blower never
/// dead-heads against closed ducts.
pub fn target(state: ZoneState, global_max_priority: u8) -> DamperPosition {
    match state {
        ZoneState::Wait | ZoneState::Error => DamperPosition::Closed,
        _ if global_max_priority == 0 => DamperPosition::Open,
        ZoneState::Off => DamperPosition::Closed,
        _ => DamperPosition::Open,
    }
}

/// Compute damper commands for this tick
///
/// Records the new position on each zone that needs to move. Zones already
/// at their target produce nothing, so planning an unchanged snapshot twice
/// issues no commands the second time.
pub fn plan(
    zones: &mut [Zone],
    global_max_priority: u8,
    stagger_ms: u64,
) -> Vec<DamperCommand, MAX_ZONES> {
    let mut commands = Vec::new();

    for zone in zones.iter_mut().filter(|z| z.is_enabled()) {
        let position = target(zone.state_new(), global_max_priority);
        if position == zone.damper() {
            continue;
        }

        zone.set_damper(position);
        let offset_ms = stagger_ms.saturating_mul(commands.len() as u64);
        let _ = commands.push(DamperCommand {
            zone: zone.index(),
            position,
            offset_ms,
        });
    }

    commands
}
