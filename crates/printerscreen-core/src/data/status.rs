//! Typed decoding of host status payloads
//!
//! Status payloads arrive as `{<name>: {field: value, ...}, ...}`. The decode
//! step sorts every entry into one of three buckets:
//! - one of the nine cached [`Subsystem`]s
//! - heater/tool telemetry ([`HeaterUpdate`])
//! - a fallback bag for everything else
//!
//! Entries that cannot be decoded are collected as rejections instead of
//! failing the whole payload.

use crate::error::PayloadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Host subsystems whose fields are cached by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    /// Active mesh and probed matrix
    BedMesh,
    /// Part cooling fan
    Fan,
    /// G-code positions and factors
    GcodeMove,
    /// Toolhead activity
    IdleTimeout,
    /// Pause flag
    PauseResume,
    /// File print progress and state
    PrintStats,
    /// Toolhead kinematics
    Toolhead,
    /// SD card file position
    VirtualSdcard,
    /// Top-level firmware readiness
    Webhooks,
}

impl Subsystem {
    /// All cached subsystems
    pub const ALL: [Subsystem; 9] = [
        Subsystem::BedMesh,
        Subsystem::Fan,
        Subsystem::GcodeMove,
        Subsystem::IdleTimeout,
        Subsystem::PauseResume,
        Subsystem::PrintStats,
        Subsystem::Toolhead,
        Subsystem::VirtualSdcard,
        Subsystem::Webhooks,
    ];

    /// Payload key of the subsystem
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::BedMesh => "bed_mesh",
            Subsystem::Fan => "fan",
            Subsystem::GcodeMove => "gcode_move",
            Subsystem::IdleTimeout => "idle_timeout",
            Subsystem::PauseResume => "pause_resume",
            Subsystem::PrintStats => "print_stats",
            Subsystem::Toolhead => "toolhead",
            Subsystem::VirtualSdcard => "virtual_sdcard",
            Subsystem::Webhooks => "webhooks",
        }
    }

    /// Look up a subsystem by payload key
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    /// Whether a change to this subsystem requires re-deriving the state
    pub fn triggers_evaluation(&self) -> bool {
        matches!(
            self,
            Subsystem::Webhooks
                | Subsystem::IdleTimeout
                | Subsystem::PauseResume
                | Subsystem::PrintStats
        )
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial heater telemetry from one payload entry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeaterUpdate {
    /// New measured temperature, if reported
    pub temperature: Option<f64>,
    /// New target temperature, if reported
    pub target: Option<f64>,
}

impl HeaterUpdate {
    /// Split heater fields out of an entry
    ///
    /// Each field is decoded on its own, so a malformed `temperature` does
    /// not discard a valid `target`. Fields other than the two heater fields
    /// are returned unchanged.
    fn decode(
        key: &str,
        fields: &Map<String, Value>,
        rejected: &mut Vec<PayloadError>,
    ) -> (Option<Self>, Map<String, Value>) {
        let mut update = Self::default();
        let mut rest = Map::new();

        for (field, value) in fields {
            let slot = match field.as_str() {
                "temperature" => &mut update.temperature,
                "target" => &mut update.target,
                _ => {
                    rest.insert(field.clone(), value.clone());
                    continue;
                }
            };
            match value.as_f64() {
                Some(number) => *slot = Some(number),
                None => rejected.push(PayloadError::Invalid {
                    reason: format!("{}.{} is not a number: {}", key, field, value),
                }),
            }
        }

        let heater = (update.temperature.is_some() || update.target.is_some()).then_some(update);
        (heater, rest)
    }
}

/// A decoded partial status payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    /// Fields for cached subsystems
    pub subsystems: BTreeMap<Subsystem, Map<String, Value>>,
    /// Heater/tool telemetry keyed by object name
    pub heaters: BTreeMap<String, HeaterUpdate>,
    /// Everything else: unknown objects, and the non-heater fields of
    /// heater entries (e.g. `extruder.pressure_advance`)
    pub other: Map<String, Value>,
    /// Entries dropped by the decoder
    pub rejected: Vec<PayloadError>,
}

impl StatusUpdate {
    /// Decode a payload of shape `{<name>: {field: value, ...}, ...}`
    ///
    /// Only a non-object root is an error; malformed entries are recorded
    /// in [`StatusUpdate::rejected`] and the rest of the payload is kept.
    pub fn from_value(payload: &Value) -> Result<Self, PayloadError> {
        let root = payload.as_object().ok_or(PayloadError::NotAnObject)?;
        let mut update = StatusUpdate::default();

        for (key, value) in root {
            if let Some(subsystem) = Subsystem::from_name(key) {
                match value.as_object() {
                    Some(fields) => {
                        update.subsystems.insert(subsystem, fields.clone());
                    }
                    None => update
                        .rejected
                        .push(PayloadError::EntryNotAnObject { key: key.clone() }),
                }
                continue;
            }

            let Some(fields) = value.as_object() else {
                update.other.insert(key.clone(), value.clone());
                continue;
            };
            let (heater, rest) = HeaterUpdate::decode(key, fields, &mut update.rejected);
            if let Some(heater) = heater {
                update.heaters.insert(key.clone(), heater);
            }
            if !rest.is_empty() {
                update.other.insert(key.clone(), Value::Object(rest));
            }
        }

        Ok(update)
    }

    /// Whether the payload touches a subsystem that drives the state
    pub fn triggers_evaluation(&self) -> bool {
        self.subsystems.keys().any(Subsystem::triggers_evaluation)
    }

    /// Whether nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.subsystems.is_empty() && self.heaters.is_empty() && self.other.is_empty()
    }
}

/// `webhooks.state` as reported by the firmware host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhooksState {
    /// Firmware starting
    Startup,
    /// Firmware ready
    Ready,
    /// Firmware shut down
    Shutdown,
    /// Firmware error
    Error,
    /// Any other value, kept verbatim
    Unknown(String),
}

impl WebhooksState {
    /// Parse the reported value (exact match)
    pub fn from_reported(value: &str) -> Self {
        match value {
            "startup" => WebhooksState::Startup,
            "ready" => WebhooksState::Ready,
            "shutdown" => WebhooksState::Shutdown,
            "error" => WebhooksState::Error,
            other => WebhooksState::Unknown(other.to_string()),
        }
    }

    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            WebhooksState::Startup => "startup",
            WebhooksState::Ready => "ready",
            WebhooksState::Shutdown => "shutdown",
            WebhooksState::Error => "error",
            WebhooksState::Unknown(s) => s,
        }
    }
}

/// `idle_timeout.state`, compared case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    /// Toolhead idle
    Idle,
    /// Toolhead executing moves
    Printing,
    /// Toolhead ready, motors enabled
    Ready,
    /// Absent or unrecognized
    Unknown,
}

impl IdleState {
    /// Parse the reported value, ignoring case
    pub fn from_reported(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "idle" => IdleState::Idle,
            "printing" => IdleState::Printing,
            "ready" => IdleState::Ready,
            _ => IdleState::Unknown,
        }
    }
}

/// `print_stats.state` as reported by the firmware host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStatsState {
    /// Last print finished
    Complete,
    /// A print is paused
    Paused,
    /// A file print is active
    Printing,
    /// No print loaded
    Standby,
    /// Absent or any other value
    Other,
}

impl PrintStatsState {
    /// Parse the reported value (exact match)
    pub fn from_reported(value: &str) -> Self {
        match value {
            "complete" => PrintStatsState::Complete,
            "paused" => PrintStatsState::Paused,
            "printing" => PrintStatsState::Printing,
            "standby" => PrintStatsState::Standby,
            _ => PrintStatsState::Other,
        }
    }
}

/// One `{device, status}` record from the power-device API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerDeviceRecord {
    /// Device name
    pub device: String,
    /// Reported status; anything but `on` is treated as off
    pub status: String,
}

impl PowerDeviceRecord {
    /// Decode a power-delta payload
    pub fn from_value(value: &Value) -> Result<Self, PayloadError> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Power-device topology payload `{devices: [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerTopology {
    /// All devices known to the host
    pub devices: Vec<PowerDeviceRecord>,
}

impl PowerTopology {
    /// Decode a power-topology payload
    pub fn from_value(value: &Value) -> Result<Self, PayloadError> {
        if value.get("devices").is_none() {
            return Err(PayloadError::MissingField {
                field: "devices".to_string(),
            });
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subsystem_names() {
        for subsystem in Subsystem::ALL {
            assert_eq!(Subsystem::from_name(subsystem.as_str()), Some(subsystem));
        }
        assert_eq!(Subsystem::from_name("heater_bed"), None);
        assert!(Subsystem::Webhooks.triggers_evaluation());
        assert!(!Subsystem::Fan.triggers_evaluation());
    }

    #[test]
    fn test_decode_buckets() {
        let update = StatusUpdate::from_value(&json!({
            "fan": {"speed": 0.5},
            "heater_bed": {"temperature": 60.1},
            "extruder": {"target": 210, "pressure_advance": 0.04},
            "motion_report": {"live_velocity": 12.0},
        }))
        .unwrap();

        assert_eq!(update.subsystems[&Subsystem::Fan]["speed"], json!(0.5));
        assert_eq!(
            update.heaters["heater_bed"],
            HeaterUpdate {
                temperature: Some(60.1),
                target: None
            }
        );
        assert_eq!(update.heaters["extruder"].target, Some(210.0));
        assert_eq!(update.other["extruder"], json!({"pressure_advance": 0.04}));
        assert!(update.other.contains_key("motion_report"));
        assert!(!update.other.contains_key("heater_bed"));
        assert!(update.rejected.is_empty());
        assert!(!update.triggers_evaluation());
    }

    #[test]
    fn test_decode_heater_fields_independently() {
        let update = StatusUpdate::from_value(&json!({
            "extruder": {"temperature": "n/a", "target": 210.0},
        }))
        .unwrap();

        assert_eq!(
            update.heaters["extruder"],
            HeaterUpdate {
                temperature: None,
                target: Some(210.0)
            }
        );
        assert_eq!(update.rejected.len(), 1);
        assert!(update.other.is_empty());
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(StatusUpdate::from_value(&json!({})).unwrap().is_empty());
        assert!(!StatusUpdate::from_value(&json!({"fan": {}}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_decode_keeps_good_entries_when_one_is_bad() {
        let update = StatusUpdate::from_value(&json!({
            "webhooks": "ready",
            "extruder": {"temperature": "hot"},
            "print_stats": {"state": "printing"},
        }))
        .unwrap();

        assert_eq!(update.rejected.len(), 2);
        assert!(update.subsystems.contains_key(&Subsystem::PrintStats));
        assert!(!update.subsystems.contains_key(&Subsystem::Webhooks));
        assert!(update.heaters.is_empty());
        assert!(update.triggers_evaluation());
    }

    #[test]
    fn test_decode_rejects_non_object_root() {
        assert_eq!(
            StatusUpdate::from_value(&json!([1, 2])),
            Err(PayloadError::NotAnObject)
        );
    }

    #[test]
    fn test_state_field_parsing() {
        assert_eq!(IdleState::from_reported("Printing"), IdleState::Printing);
        assert_eq!(IdleState::from_reported("IDLE"), IdleState::Idle);
        assert_eq!(IdleState::from_reported(""), IdleState::Unknown);
        assert_eq!(
            PrintStatsState::from_reported("Printing"),
            PrintStatsState::Other
        );
        assert_eq!(
            WebhooksState::from_reported("weird"),
            WebhooksState::Unknown("weird".to_string())
        );
    }

    #[test]
    fn test_power_payloads() {
        let topology = PowerTopology::from_value(&json!({
            "devices": [
                {"device": "printer", "status": "on", "type": "gpio"},
                {"device": "lights", "status": "off"}
            ]
        }))
        .unwrap();
        assert_eq!(topology.devices.len(), 2);
        assert_eq!(topology.devices[0].device, "printer");

        assert!(PowerTopology::from_value(&json!({})).is_err());
        assert!(PowerDeviceRecord::from_value(&json!({"device": "x"})).is_err());
    }
}
