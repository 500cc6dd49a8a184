//! PrinterScreen Settings Crate
//!
//! Loads, validates and saves the screen configuration file.

pub mod config;
pub mod error;

pub use config::{MainSettings, ScreenConfig, TemperatureSettings, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
