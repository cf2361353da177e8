//! Configuration handling for ddlforge

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::Result;

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

/// Represents the complete ddlforge configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    pub logging: Option<LoggingConfig>,
}

/// Engine behaviour configuration
///
/// These flags steer diffing, planning and statement generation; none of them
/// touch a live database connection.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether identifier comparisons are case sensitive
    pub case_sensitive: bool,
    /// Acknowledge changes that may truncate or reinterpret stored data.
    /// Planning fails with a lossy-change error when this is false.
    pub allow_lossy_changes: bool,
    /// Whether the differ may emit table removals
    pub allow_table_removal: bool,
    /// Whether the differ may emit column removals
    pub allow_column_removal: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            allow_lossy_changes: false,
            allow_table_removal: true,
            allow_column_removal: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub stdout: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert!(!config.case_sensitive);
        assert!(!config.allow_lossy_changes);
        assert!(config.allow_table_removal);
        assert!(config.allow_column_removal);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            case_sensitive = true
            allow_lossy_changes = true

            [logging]
            level = "debug"
            format = "text"
            stdout = true
            "#,
        )
        .expect("config should parse");

        assert!(config.engine.case_sensitive);
        assert!(config.engine.allow_lossy_changes);
        assert!(config.engine.allow_table_removal);
        assert_eq!(config.logging.unwrap().level, "debug");
    }
}
