//! Configuration management for booking-export
//!
//! This module handles loading, parsing, and validating configuration:
//! - Configuration file (TOML format)
//! - Command-line arguments (applied by the CLI on top of the file)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::export::ExportFormat;

/// Longest sheet name a workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Export configuration
    #[serde(default)]
    pub export: ExportSettings,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Export-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory downloads are saved into
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Author written into document properties
    #[serde(default)]
    pub author: Option<String>,

    /// Format used when `--format` is not given
    #[serde(default = "default_export_format")]
    pub default_format: ExportFormat,

    /// Append a timestamp to file names (legacy pages always do)
    #[serde(default = "default_include_timestamp")]
    pub include_timestamp: bool,

    /// Sheet name override for workbook exports
    #[serde(default)]
    pub sheet_name: Option<String>,

    /// File name prefix override
    #[serde(default)]
    pub filename_prefix: Option<String>,
}

/// Display and output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,

    /// Show a spinner while an export runs
    #[serde(default = "default_show_spinner")]
    pub show_spinner: bool,

    /// Maximum cell width in preview tables
    #[serde(default = "default_max_cell_width")]
    pub max_cell_width: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_output_dir() -> String {
    ".".to_string()
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Csv
}

fn default_include_timestamp() -> bool {
    true
}

fn default_color_output() -> bool {
    true
}

fn default_show_spinner() -> bool {
    true
}

fn default_max_cell_width() -> usize {
    32
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            author: None,
            default_format: default_export_format(),
            include_timestamp: default_include_timestamp(),
            sheet_name: None,
            filename_prefix: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
            show_spinner: default_show_spinner(),
            max_cell_width: default_max_cell_width(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from an explicit path or the default location
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Arguments
    /// * `path` - Optional explicit path
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.booking-export/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".booking-export")
            .join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            crate::utils::fs::ensure_dir_exists(parent)?;
        }
        std::fs::write(path, self.to_toml_with_comments()?)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.export.output_dir.trim().is_empty() {
            return Err(invalid("export.output_dir", &self.export.output_dir));
        }

        if let Some(sheet_name) = &self.export.sheet_name {
            if sheet_name.trim().is_empty() || sheet_name.chars().count() > MAX_SHEET_NAME_LEN {
                return Err(invalid("export.sheet_name", sheet_name));
            }
        }

        if let Some(prefix) = &self.export.filename_prefix {
            if prefix.trim().is_empty() {
                return Err(invalid("export.filename_prefix", prefix));
            }
        }

        if self.display.max_cell_width < 4 {
            return Err(invalid(
                "display.max_cell_width",
                &self.display.max_cell_width.to_string(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as commented TOML
    pub fn to_toml_with_comments(&self) -> Result<String> {
        let export = toml::to_string(&self.export)?;
        let display = toml::to_string(&self.display)?;
        let logging = toml::to_string(&self.logging)?;

        Ok(format!(
            "# booking-export configuration\n\
             \n\
             # Export defaults: output directory, document author, default format\n\
             [export]\n\
             {export}\n\
             # Terminal output\n\
             [display]\n\
             {display}\n\
             # Log level: error, warn, info, debug, trace\n\
             [logging]\n\
             {logging}"
        ))
    }
}

fn invalid(field: &str, value: &str) -> crate::error::ExportError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.export.output_dir, ".");
        assert_eq!(config.export.default_format, ExportFormat::Csv);
        assert!(config.export.include_timestamp);
        assert!(config.display.color_output);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [export]
            default_format = "excel"
            author = "Reservations Team"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.export.default_format, ExportFormat::Excel);
        assert_eq!(config.export.author.as_deref(), Some("Reservations Team"));
        assert_eq!(config.export.output_dir, ".");
        assert!(config.display.show_spinner);
        assert_eq!(config.logging.level.to_tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_format_in_file() {
        let err = Config::from_toml_str("[export]\ndefault_format = \"pdf\"\n").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_validate_sheet_name() {
        let mut config = Config::default();
        config.export.sheet_name = Some("x".repeat(32));
        assert!(config.validate().is_err());

        config.export.sheet_name = Some("  ".to_string());
        assert!(config.validate().is_err());

        config.export.sheet_name = Some("Bookings".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_prefix() {
        let mut config = Config::default();
        config.export.filename_prefix = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_with_comments_round_trip() {
        let mut config = Config::default();
        config.export.author = Some("Back Office".to_string());

        let text = config.to_toml_with_comments().unwrap();
        assert!(text.starts_with("# booking-export configuration"));
        assert!(text.contains("[export]"));
        assert!(text.contains("[logging]"));

        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.color_output = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load_from_file(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(Config::from_file(&path).is_err());
        assert_eq!(Config::load_from_file(Some(&path)).unwrap(), Config::default());
    }
}
