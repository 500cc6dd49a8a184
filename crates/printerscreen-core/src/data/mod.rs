//! Data models for printer state, heaters, and power devices
//!
//! This module provides:
//! - The enumerated operational state and the internal evaluation candidate
//! - Heater/tool telemetry records
//! - Power device status normalization
//! - Configuration snapshot and bed mesh profiles ([`config`])
//! - Typed decoding of host status payloads ([`status`])

pub mod config;
pub mod status;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use config::{BedMeshProfile, ConfigSection, PrinterConfig};
pub use status::{
    HeaterUpdate, IdleState, PowerDeviceRecord, PowerTopology, PrintStatsState, StatusUpdate,
    Subsystem, WebhooksState,
};

/// Coarse operational state of the printer as seen by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterState {
    /// No connection to the firmware host
    Disconnected,
    /// Firmware reported an error
    Error,
    /// A file print is paused
    Paused,
    /// A file print is running
    Printing,
    /// Firmware ready and idle
    Ready,
    /// Firmware is starting up
    Startup,
    /// Firmware has shut down
    Shutdown,
}

impl PrinterState {
    /// All recognized states, in callback-slot order
    pub const ALL: [PrinterState; 7] = [
        PrinterState::Disconnected,
        PrinterState::Error,
        PrinterState::Paused,
        PrinterState::Printing,
        PrinterState::Ready,
        PrinterState::Startup,
        PrinterState::Shutdown,
    ];

    /// Wire name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterState::Disconnected => "disconnected",
            PrinterState::Error => "error",
            PrinterState::Paused => "paused",
            PrinterState::Printing => "printing",
            PrinterState::Ready => "ready",
            PrinterState::Startup => "startup",
            PrinterState::Shutdown => "shutdown",
        }
    }

    /// Look up a state by its exact wire name
    ///
    /// Returns `None` for anything outside the seven recognized names,
    /// including the transient `busy` condition.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    /// Whether the printer can accept motion and temperature commands
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            PrinterState::Ready | PrinterState::Printing | PrinterState::Paused
        )
    }
}

impl fmt::Display for PrinterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrinterState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("Unknown printer state: {}", s))
    }
}

/// Result of the state reconciliation policy
///
/// `Busy` marks a toolhead moving without an active file print. It is
/// evaluated but never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCandidate {
    /// A state that may become the observable state
    Observable(PrinterState),
    /// Toolhead moving for a reason other than a file print
    Busy,
}

/// Runtime telemetry for one heater or tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaterDevice {
    /// Measured temperature in °C
    pub temperature: f64,
    /// Target temperature in °C
    pub target: f64,
}

/// Field selector for heater telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterField {
    /// Measured temperature
    Temperature,
    /// Target temperature
    Target,
}

impl HeaterField {
    /// Payload key for this field
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaterField::Temperature => "temperature",
            HeaterField::Target => "target",
        }
    }
}

impl HeaterDevice {
    /// Read one field
    pub fn get(&self, field: HeaterField) -> f64 {
        match field {
            HeaterField::Temperature => self.temperature,
            HeaterField::Target => self.target,
        }
    }

    /// Write one field
    pub fn set(&mut self, field: HeaterField, value: f64) {
        match field {
            HeaterField::Temperature => self.temperature = value,
            HeaterField::Target => self.target = value,
        }
    }
}

/// Status of a switchable power device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    /// Device is powered
    On,
    /// Device is off, or reported anything other than `on`
    #[default]
    Off,
}

impl PowerStatus {
    /// Normalize a host-reported status string
    ///
    /// Only the exact string `on` maps to [`PowerStatus::On`].
    pub fn from_reported(status: &str) -> Self {
        if status == "on" {
            PowerStatus::On
        } else {
            PowerStatus::Off
        }
    }

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerStatus::On => "on",
            PowerStatus::Off => "off",
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
