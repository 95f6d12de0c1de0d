//! Inter-task communication channels
//!
//! Static embassy-sync primitives shared by the controller task, the damper
//! task and the main heartbeat loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use plenum_core::config::MAX_ZONES;
use plenum_core::damper::DamperCommand;
use plenum_core::state::UnitMode;

/// Room for two full ticks of damper moves
const DAMPER_CHANNEL_SIZE: usize = 2 * MAX_ZONES;

/// Damper moves from the controller to the sequencing task
pub static DAMPER_CMD: Channel<CriticalSectionRawMutex, DamperCommand, DAMPER_CHANNEL_SIZE> =
    Channel::new();

/// Latest central-unit mode (updated by controller)
pub static MODE_SIGNAL: Signal<CriticalSectionRawMutex, UnitMode> = Signal::new();
