//! Screen configuration
//!
//! The configuration file is organized into sections:
//! - `[main]`: host connection and display size
//! - `[temperature]`: heater limits and step sizes
//!
//! Both `.toml` and `.json` files are supported. Missing sections and
//! fields take their defaults.

use printerscreen_core::control::{DEFAULT_DELTA, DEFAULT_DELTAS};
use printerscreen_core::{ControlError, TemperatureControl, TemperatureLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsResult};

/// File name of the configuration in the home directory
pub const DEFAULT_CONFIG_FILE: &str = "PrinterScreen.toml";

/// Host connection and display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainSettings {
    /// Host running the printer API
    pub moonraker_host: String,
    /// Port of the printer API
    pub moonraker_port: u16,
    /// API key, when the host requires one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moonraker_api_key: Option<String>,
    /// Screen width in pixels; the display size when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Screen height in pixels; the display size when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            moonraker_host: "127.0.0.1".to_string(),
            moonraker_port: 7125,
            moonraker_api_key: None,
            width: None,
            height: None,
        }
    }
}

/// Heater limits and target step sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureSettings {
    /// Maximum extruder target in °C
    pub max_extruder_temp: f64,
    /// Maximum bed target in °C
    pub max_bed_temp: f64,
    /// Offered step sizes in °C
    pub deltas: Vec<u32>,
    /// Step size selected initially
    pub default_delta: u32,
}

impl Default for TemperatureSettings {
    fn default() -> Self {
        let limits = TemperatureLimits::default();
        Self {
            max_extruder_temp: limits.max_extruder,
            max_bed_temp: limits.max_bed,
            deltas: DEFAULT_DELTAS.to_vec(),
            default_delta: DEFAULT_DELTA,
        }
    }
}

impl TemperatureSettings {
    pub fn limits(&self) -> TemperatureLimits {
        TemperatureLimits {
            max_extruder: self.max_extruder_temp,
            max_bed: self.max_bed_temp,
        }
    }

    /// Build a temperature control using these settings
    pub fn control(&self) -> Result<TemperatureControl, ControlError> {
        TemperatureControl::with_settings(self.deltas.clone(), self.default_delta, self.limits())
    }
}

/// Complete screen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScreenConfig {
    /// Connection and display settings
    pub main: MainSettings,
    /// Temperature control settings
    pub temperature: TemperatureSettings,
}

impl ScreenConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration path, `~/PrinterScreen.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded screen config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or use defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            tracing::info!(
                "No config file at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.main.moonraker_host.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "main.moonraker_host".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.main.moonraker_port == 0 {
            return Err(out_of_range("main.moonraker_port", 0));
        }

        if self.main.width == Some(0) {
            return Err(out_of_range("main.width", 0));
        }

        if self.main.height == Some(0) {
            return Err(out_of_range("main.height", 0));
        }

        let temperature = &self.temperature;
        if temperature.max_extruder_temp <= 0.0 {
            return Err(out_of_range(
                "temperature.max_extruder_temp",
                temperature.max_extruder_temp,
            ));
        }

        if temperature.max_bed_temp <= 0.0 {
            return Err(out_of_range(
                "temperature.max_bed_temp",
                temperature.max_bed_temp,
            ));
        }

        if temperature.deltas.is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "temperature.deltas".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if !temperature.deltas.contains(&temperature.default_delta) {
            return Err(ConfigError::InvalidSetting {
                key: "temperature.default_delta".to_string(),
                reason: format!("{} is not one of the deltas", temperature.default_delta),
            });
        }

        Ok(())
    }
}

fn out_of_range(key: &str, value: impl std::fmt::Display) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScreenConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.main.moonraker_port, 7125);
        assert_eq!(config.temperature.deltas, vec![1, 5, 10, 25]);
        assert_eq!(config.temperature.limits(), TemperatureLimits::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScreenConfig::new();
        config.main.moonraker_port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));

        let mut config = ScreenConfig::new();
        config.main.moonraker_host = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = ScreenConfig::new();
        config.main.width = Some(0);
        assert!(config.validate().is_err());

        let mut config = ScreenConfig::new();
        config.temperature.max_bed_temp = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScreenConfig::new();
        config.temperature.deltas.clear();
        assert!(config.validate().is_err());

        let mut config = ScreenConfig::new();
        config.temperature.default_delta = 7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { ref key, .. }) if key == "temperature.default_delta"
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ScreenConfig = toml::from_str(
            r#"
            [main]
            moonraker_host = "voron.local"

            [temperature]
            max_bed_temp = 110.0
            "#,
        )
        .unwrap();

        assert_eq!(config.main.moonraker_host, "voron.local");
        assert_eq!(config.main.moonraker_port, 7125);
        assert_eq!(config.temperature.max_bed_temp, 110.0);
        assert_eq!(config.temperature.default_delta, 10);
    }

    #[test]
    fn test_control_from_settings() {
        let settings = TemperatureSettings {
            deltas: vec![2, 20],
            default_delta: 20,
            ..TemperatureSettings::default()
        };
        let control = settings.control().unwrap();
        assert_eq!(control.delta(), 20);
        assert_eq!(control.deltas(), [2, 20]);
    }

    #[test]
    fn test_default_path() {
        assert!(ScreenConfig::default_path().ends_with(DEFAULT_CONFIG_FILE));
    }
}
