//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `tessera.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value is out of its allowed range.
    #[error("invalid value for `{key}`: {reason}")]
    ValidationError {
        /// Dotted key of the offending value, e.g. `mapping.ii`.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}
