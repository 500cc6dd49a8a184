//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

use crate::data::{PowerStatus, PrinterState};

/// Root event enum for printer model events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrinterEvent {
    /// The observable operational state changed
    StateChanged {
        /// State before the transition.
        previous: PrinterState,
        /// State after the transition.
        current: PrinterState,
    },
    /// A known power device reported a new status
    PowerChanged {
        /// Device name.
        device: String,
        /// Normalized status.
        status: PowerStatus,
    },
    /// The model was rebuilt from a full snapshot
    Reinitialized {
        /// Firmware software version.
        software_version: String,
        /// Number of tools discovered.
        tool_count: usize,
        /// Number of independently heated extruders.
        extruder_count: usize,
    },
}

impl PrinterEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            PrinterEvent::StateChanged { .. } => EventCategory::State,
            PrinterEvent::PowerChanged { .. } => EventCategory::Power,
            PrinterEvent::Reinitialized { .. } => EventCategory::Config,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            PrinterEvent::StateChanged { previous, current } => {
                format!("State changed from '{}' to '{}'", previous, current)
            }
            PrinterEvent::PowerChanged { device, status } => {
                format!("Power device '{}' is {}", device, status)
            }
            PrinterEvent::Reinitialized {
                software_version,
                tool_count,
                extruder_count,
            } => format!(
                "Reinitialized for firmware {} ({} tools, {} heaters)",
                software_version, tool_count, extruder_count
            ),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Operational state transitions.
    State,
    /// Power device status changes.
    Power,
    /// Configuration reloads.
    Config,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::State => write!(f, "State"),
            EventCategory::Power => write!(f, "Power"),
            EventCategory::Config => write!(f, "Config"),
        }
    }
}
