//! Configuration types
//!
//! Board-agnostic configuration structures and the TOML parser that fills
//! them.

pub mod hardware;
pub mod parse;
pub mod types;

pub use hardware::*;
pub use parse::{parse_config, ParseError};
pub use types::*;
