//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::MapperConfig;
use std::path::Path;

/// Loads and validates a `tessera.toml` file.
pub fn load_config(path: &Path) -> Result<MapperConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tessera.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<MapperConfig, ConfigError> {
    let config: MapperConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks value ranges that serde cannot express.
///
/// Also used by the CLI after command-line overrides are applied.
pub fn validate_config(config: &MapperConfig) -> Result<(), ConfigError> {
    let m = &config.mapping;
    at_least_one("mapping.ii", u64::from(m.ii))?;
    at_least_one("mapping.max_attempts", u64::from(m.max_attempts))?;
    at_least_one("mapping.try_budget", m.try_budget)?;
    at_least_one("mapping.single_path_edge_limit", m.single_path_edge_limit as u64)?;
    if config.output.name.is_empty() {
        return Err(ConfigError::ValidationError {
            key: "output.name".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn at_least_one(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, MapperConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[mapping]
ii = 2
max_delay = 3
single_path_time_limit = 7
single_path_edge_limit = 12
try_budget = 500
max_attempts = 8
time_limit_secs = 30
seed = 42

[output]
name = "fir"
internal_marker = "internal"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.mapping.ii, 2);
        assert_eq!(config.mapping.max_delay, 3);
        assert_eq!(config.mapping.single_path_time_limit, 7);
        assert_eq!(config.mapping.single_path_edge_limit, 12);
        assert_eq!(config.mapping.try_budget, 500);
        assert_eq!(config.mapping.max_attempts, 8);
        assert_eq!(config.mapping.time_limit_secs, Some(30));
        assert_eq!(config.mapping.seed, 42);
        assert_eq!(config.output.name, "fir");
        assert_eq!(config.output.internal_marker, "internal");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[mapping]\nii = 3\n").unwrap();
        assert_eq!(config.mapping.ii, 3);
        assert_eq!(config.mapping.max_delay, 4);
        assert_eq!(config.output.name, "mapping");
    }

    #[test]
    fn zero_ii_rejected() {
        let err = load_config_from_str("[mapping]\nii = 0\n").unwrap_err();
        match err {
            ConfigError::ValidationError { key, .. } => assert_eq!(key, "mapping.ii"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = load_config_from_str("[mapping]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = load_config_from_str("[mapping]\niii = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = load_config_from_str("[mapping\nii = 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nname = \"kernel\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.name, "kernel");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("tessera.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
