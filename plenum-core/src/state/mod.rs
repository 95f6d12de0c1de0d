//! Zone and equipment state definitions
//!
//! Zone states, central-unit modes and the events the control passes
//! report. The state sets are explicit, finite and carry their own
//! priority and output tables.

pub mod events;
pub mod mode;
pub mod zone_state;

pub use events::{ControlEvent, EventLog, ModeChange, Transition, MAX_EVENTS};
pub use mode::{OutputPattern, ThermalKind, UnitMode, MODE_COUNT};
pub use zone_state::{DemandSignals, ZoneState};
