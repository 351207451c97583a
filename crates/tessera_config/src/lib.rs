//! Parsing and validation of `tessera.toml` mapper configuration files.
//!
//! Every key is optional; a missing file section falls back to the defaults
//! documented on [`MappingConfig`] and [`OutputConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config};
pub use types::*;
