//! Host notification decoding
//!
//! The host pushes JSON-RPC notifications of the form
//! `{"jsonrpc": "2.0", "method": "notify_...", "params": [payload]}`.
//! [`HostNotification::from_jsonrpc`] turns them into a typed value; the
//! payload is always the first element of `params`.

use printerscreen_core::{PowerDeviceRecord, StatusUpdate};
use serde_json::Value;

use crate::error::{NotificationError, Result};

pub const NOTIFY_STATUS_UPDATE: &str = "notify_status_update";
pub const NOTIFY_KLIPPY_READY: &str = "notify_klippy_ready";
pub const NOTIFY_KLIPPY_DISCONNECTED: &str = "notify_klippy_disconnected";
pub const NOTIFY_POWER_CHANGED: &str = "notify_power_changed";
pub const NOTIFY_GCODE_RESPONSE: &str = "notify_gcode_response";
pub const NOTIFY_FILELIST_CHANGED: &str = "notify_filelist_changed";
pub const NOTIFY_METADATA_UPDATE: &str = "notify_metadata_update";

/// A decoded host notification
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotification {
    /// Partial printer object status
    StatusUpdate(StatusUpdate),
    /// Firmware became ready
    KlippyReady,
    /// Firmware connection lost
    KlippyDisconnected,
    /// A power device changed status
    PowerChanged(PowerDeviceRecord),
    /// A line of g-code console output
    GcodeResponse(String),
    /// The file list changed; the payload is passed through
    FilelistChanged(Value),
    /// Metadata for a file was updated
    MetadataUpdate {
        /// The file whose metadata changed
        filename: String,
    },
    /// Any other method
    Other {
        /// The notification method
        method: String,
    },
}

impl HostNotification {
    /// Decode a JSON-RPC notification
    pub fn from_jsonrpc(message: &Value) -> Result<Self> {
        let root = message.as_object().ok_or(NotificationError::NotAnObject)?;
        let method = root
            .get("method")
            .and_then(Value::as_str)
            .ok_or(NotificationError::MissingMethod)?;
        let payload = root
            .get("params")
            .and_then(Value::as_array)
            .and_then(|params| params.first());
        let require_payload = || {
            payload.ok_or_else(|| NotificationError::MissingParams {
                method: method.to_string(),
            })
        };

        let notification = match method {
            NOTIFY_STATUS_UPDATE => {
                HostNotification::StatusUpdate(StatusUpdate::from_value(require_payload()?)?)
            }
            NOTIFY_KLIPPY_READY => HostNotification::KlippyReady,
            NOTIFY_KLIPPY_DISCONNECTED => HostNotification::KlippyDisconnected,
            NOTIFY_POWER_CHANGED => {
                HostNotification::PowerChanged(PowerDeviceRecord::from_value(require_payload()?)?)
            }
            NOTIFY_GCODE_RESPONSE => {
                let line = require_payload()?.as_str().ok_or_else(|| {
                    NotificationError::InvalidParams {
                        method: method.to_string(),
                        reason: "expected a string".to_string(),
                    }
                })?;
                HostNotification::GcodeResponse(line.to_string())
            }
            NOTIFY_FILELIST_CHANGED => HostNotification::FilelistChanged(require_payload()?.clone()),
            NOTIFY_METADATA_UPDATE => {
                let filename = require_payload()?
                    .get("filename")
                    .and_then(Value::as_str)
                    .ok_or_else(|| NotificationError::InvalidParams {
                        method: method.to_string(),
                        reason: "missing filename".to_string(),
                    })?;
                HostNotification::MetadataUpdate {
                    filename: filename.to_string(),
                }
            }
            other => HostNotification::Other {
                method: other.to_string(),
            },
        };
        Ok(notification)
    }

    /// The JSON-RPC method this notification was decoded from
    pub fn method(&self) -> &str {
        match self {
            HostNotification::StatusUpdate(_) => NOTIFY_STATUS_UPDATE,
            HostNotification::KlippyReady => NOTIFY_KLIPPY_READY,
            HostNotification::KlippyDisconnected => NOTIFY_KLIPPY_DISCONNECTED,
            HostNotification::PowerChanged(_) => NOTIFY_POWER_CHANGED,
            HostNotification::GcodeResponse(_) => NOTIFY_GCODE_RESPONSE,
            HostNotification::FilelistChanged(_) => NOTIFY_FILELIST_CHANGED,
            HostNotification::MetadataUpdate { .. } => NOTIFY_METADATA_UPDATE,
            HostNotification::Other { method } => method,
        }
    }
}
