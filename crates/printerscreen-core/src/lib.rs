//! # PrinterScreen Core
//!
//! Core types for the PrinterScreen touchscreen front-end.
//! Provides the printer state model, typed decoding of host payloads,
//! configuration and bed mesh parsing, the state event bus and the
//! non-visual temperature control logic.

pub mod control;
pub mod data;
pub mod error;
pub mod event_bus;
pub mod model;
pub mod types;

pub use control::{Direction, HeaterCommand, NumpadKey, TemperatureControl, TemperatureLimits};

pub use data::{
    BedMeshProfile, ConfigSection, HeaterDevice, HeaterField, HeaterUpdate, PowerDeviceRecord,
    PowerStatus, PowerTopology, PrinterConfig, PrinterState, StateCandidate, StatusUpdate,
    Subsystem,
};

pub use error::{ControlError, Error, MeshError, ModelError, PayloadError, Result};

// Re-export event bus for convenience
pub use event_bus::{
    EventBus, EventBusConfig, EventCategory, EventFilter, PrinterEvent, SubscriptionId,
};

pub use model::{PrinterModel, PrinterStatusSummary};

pub use types::{Callback, DataCallback};
