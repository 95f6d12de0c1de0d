//! Cross-zone passes
//!
//! - [`purge`]: arm and enforce post-demand purge windows
//! - [`priority`]: reduce all working states to one global priority and
//!   park everything below it in `Wait`

pub mod priority;
pub mod purge;

pub use priority::{any_error, arbitrate, global_max_priority};
pub use purge::{manage as manage_purge, ActiveCounts};
