//! Configuration management for keytiming
//!
//! Settings are read from a platform-specific TOML file when present and
//! fall back to defaults otherwise.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keytiming/config.toml` |
//! | macOS | `~/Library/Application Support/keytiming/config.toml` |
//! | Windows | `%APPDATA%\keytiming\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keytiming::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.collector.poll_interval_ms = 2;
//! config.save().expect("Failed to save config");
//! ```

use crate::timing::{EngineOptions, OUTLIER_THRESHOLD_US};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file, creating its directory if needed.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("keytiming");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Event collection settings
    #[serde(default)]
    pub collector: CollectorConfig,
    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Extra or replacement key names; TOML keys are decimal key codes
    #[serde(default)]
    pub key_names: BTreeMap<String, String>,
}

/// Event collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Sleep between device reads while idle, in milliseconds
    pub poll_interval_ms: u64,
    /// Intervals at or above this (microseconds) are ignored by statistics
    pub outlier_threshold_us: u64,
    /// Log running statistics after every key event (info level)
    pub log_running_stats: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5,
            outlier_threshold_us: OUTLIER_THRESHOLD_US,
            log_running_stats: true,
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Label for keys missing from the name table
    pub unknown_key_label: String,
    /// Color theme for the report table
    pub theme: Theme,
    /// Output format
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            unknown_key_label: "--".to_string(),
            theme: Theme::Dark,
            format: ReportFormat::Table,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// How the final report is printed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Bordered terminal table
    Table,
    /// Fixed-width text
    Plain,
    /// Pretty-printed JSON
    Json,
}

impl ReportFormat {
    /// Format to print with given where stdout goes.
    ///
    /// The table draws into an inline terminal viewport, so redirected
    /// output gets the plain text table instead.
    pub fn for_output(self, stdout_is_tty: bool) -> Self {
        match self {
            Self::Table if !stdout_is_tty => Self::Plain,
            other => other,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Idle sleep between device reads
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.collector.poll_interval_ms.max(1))
    }

    /// Configured key names with parseable codes.
    ///
    /// Entries whose key is not a decimal `u16` are logged and skipped.
    pub fn key_name_overrides(&self) -> Vec<(u16, String)> {
        self.key_names
            .iter()
            .filter_map(|(code, name)| match code.trim().parse::<u16>() {
                Ok(code) => Some((code, name.clone())),
                Err(_) => {
                    log::warn!("Ignoring key name for invalid key code {:?}", code);
                    None
                }
            })
            .collect()
    }

    /// Timing engine options derived from this config
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            outlier_threshold_us: self.collector.outlier_threshold_us,
            unknown_key_label: self.report.unknown_key_label.clone(),
            log_running_stats: self.collector.log_running_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path() -> PathBuf {
        env::temp_dir().join(format!("keytiming-test-{}.toml", std::process::id()))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.collector.poll_interval_ms, 5);
        assert_eq!(config.collector.outlier_threshold_us, 1_000_000);
        assert!(config.collector.log_running_stats);
        assert_eq!(config.report.unknown_key_label, "--");
        assert_eq!(config.report.theme, Theme::Dark);
        assert_eq!(config.report.format, ReportFormat::Table);
        assert!(config.key_names.is_empty());
    }

    #[test]
    fn poll_interval_never_zero() {
        let mut config = Config::default();
        config.collector.poll_interval_ms = 0;
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn engine_options_follow_config() {
        let mut config = Config::default();
        config.collector.outlier_threshold_us = 500_000;
        config.collector.log_running_stats = false;
        config.report.unknown_key_label = "?".to_string();

        let options = config.engine_options();
        assert_eq!(options.outlier_threshold_us, 500_000);
        assert!(!options.log_running_stats);
        assert_eq!(options.unknown_key_label, "?");
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let path = temp_config_path();

        let mut config = Config::default();
        config.collector.poll_interval_ms = 2;
        config.report.theme = Theme::Light;
        config.key_names.insert("240".to_string(), "Fn".to_string());

        config.save_to(&path).expect("Failed to save config");
        let loaded = Config::load_from(&path).expect("Failed to load config");

        assert_eq!(loaded.collector.poll_interval_ms, 2);
        assert_eq!(loaded.report.theme, Theme::Light);
        assert_eq!(loaded.key_name_overrides(), vec![(240, "Fn".to_string())]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_fails() {
        let result = Config::load_from(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[collector]
poll_interval_ms = 1

[report]
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.collector.poll_interval_ms, 1);
        assert_eq!(config.collector.outlier_threshold_us, 1_000_000);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.report.unknown_key_label, "--");
    }

    #[test]
    fn key_names_deserialize_from_toml() {
        let toml_str = r#"
[key_names]
240 = "Fn"
30 = "Alpha"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        let overrides = config.key_name_overrides();
        assert_eq!(overrides.len(), 2);
        assert!(overrides.contains(&(30, "Alpha".to_string())));
    }

    #[test]
    fn invalid_key_codes_are_skipped() {
        let mut config = Config::default();
        config.key_names.insert("A".to_string(), "Alpha".to_string());
        config.key_names.insert("70000".to_string(), "Huge".to_string());
        config.key_names.insert("31".to_string(), "Ess".to_string());
        assert_eq!(config.key_name_overrides(), vec![(31, "Ess".to_string())]);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let path = env::temp_dir().join(format!("keytiming-bad-{}.toml", std::process::id()));
        fs::write(&path, "collector = [").unwrap();
        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn table_falls_back_to_plain_without_terminal() {
        assert_eq!(ReportFormat::Table.for_output(true), ReportFormat::Table);
        assert_eq!(ReportFormat::Table.for_output(false), ReportFormat::Plain);
    }

    #[test]
    fn text_formats_ignore_terminal() {
        for format in [ReportFormat::Plain, ReportFormat::Json] {
            assert_eq!(format.for_output(true), format);
            assert_eq!(format.for_output(false), format);
        }
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NoConfigDir;
        assert_eq!(err.to_string(), "Could not determine config directory");
    }
}
