//! Configuration loading and diagnostics
//!
//! The zoning configuration is embedded at build time and parsed by the
//! no_std parser in plenum-core.

pub mod dump;
pub mod loader;

pub use dump::dump;
pub use loader::load_embedded;
