//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod controller;
pub mod damper;

pub use controller::{controller_task, ControllerIo};
pub use damper::{damper_task, DamperBank};
