//! Node configuration
//!
//! Board-agnostic configuration structures loaded from TOML.

pub mod loader;
pub mod types;

pub use loader::{load_config, parse_config, ConfigError};
pub use types::*;
