//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Environment variables
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default: DefaultConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub tui: TuiConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Built-in machine used when neither --machine nor --file is given
    #[serde(default = "default_machine")]
    pub machine: String,
}

/// Geometry handed to the layout engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance between neighbouring states of one level
    #[serde(default = "default_horizontal_gap")]
    pub horizontal_gap: f64,

    /// Distance between levels
    #[serde(default = "default_vertical_gap")]
    pub vertical_gap: f64,

    #[serde(default = "default_node_radius")]
    pub node_radius: f64,
}

/// Terminal visualizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Event poll interval in milliseconds
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Pan distance per key press, in layout units
    #[serde(default = "default_pan_step")]
    pub pan_step: f64,

    /// Zoom multiplier per key press
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
}

/// File watching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_watch_interval")]
    pub interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path
    pub file: Option<PathBuf>,
}

// Default value functions

fn default_machine() -> String {
    "bb-suffix".to_string()
}

fn default_horizontal_gap() -> f64 {
    180.0
}

fn default_vertical_gap() -> f64 {
    140.0
}

fn default_node_radius() -> f64 {
    40.0
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_pan_step() -> f64 {
    60.0
}

fn default_zoom_step() -> f64 {
    1.1
}

fn default_watch_interval() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            machine: default_machine(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: default_horizontal_gap(),
            vertical_gap: default_vertical_gap(),
            node_radius: default_node_radius(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            pan_step: default_pan_step(),
            zoom_step: default_zoom_step(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl TuiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Candidate config locations, in search order:
    /// 1. ./config.toml
    /// 2. ~/.dfa-state-viz/config.toml
    /// 3. /etc/dfa-state-viz/config.toml
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".dfa-state-viz").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/dfa-state-viz/config.toml"));
        paths
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|path| path.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }

    /// Reject settings the layout engine and visualizer cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        };

        positive("layout.horizontal_gap", self.layout.horizontal_gap)?;
        positive("layout.vertical_gap", self.layout.vertical_gap)?;
        positive("layout.node_radius", self.layout.node_radius)?;
        positive("tui.pan_step", self.tui.pan_step)?;

        if !(self.tui.zoom_step.is_finite() && self.tui.zoom_step > 1.0) {
            return Err(Error::config(format!(
                "tui.zoom_step must be greater than 1, got {}",
                self.tui.zoom_step
            )));
        }
        if self.tui.tick_rate_ms == 0 {
            return Err(Error::config("tui.tick_rate_ms must be at least 1"));
        }
        if self.watch.interval_secs == 0 {
            return Err(Error::config("watch.interval_secs must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default.machine, "bb-suffix");
        assert_eq!(config.layout.horizontal_gap, 180.0);
        assert_eq!(config.layout.vertical_gap, 140.0);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[default]
machine = "a-then-b"

[layout]
horizontal_gap = 100.0

[watch]
interval_secs = 5

[logging]
level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.default.machine, "a-then-b");
        assert_eq!(config.layout.horizontal_gap, 100.0);
        assert_eq!(config.layout.vertical_gap, 140.0);
        assert_eq!(config.watch.interval(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_rejects_bad_gaps() {
        let mut config = Config::default();
        config.layout.horizontal_gap = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.layout.vertical_gap = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tui.zoom_step = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\nvertical_gap = -3.0").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("layout.vertical_gap"));
    }
}
