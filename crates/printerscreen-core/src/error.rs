//! Error handling for PrinterScreen
//!
//! Provides error types for every layer of the printer model:
//! - Model errors (snapshot preconditions, malformed configuration)
//! - Mesh errors (bed mesh profile coercion)
//! - Payload errors (host payloads that fail the typed decode step)
//! - Control errors (direct temperature interaction)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Bed mesh profile error type
///
/// Raised while coercing a `bed_mesh <profile>` configuration section into a
/// typed [`crate::data::BedMeshProfile`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A required field is absent from the section
    #[error("Mesh profile '{profile}' is missing field '{field}'")]
    MissingField {
        /// The mesh section name.
        profile: String,
        /// The absent field.
        field: String,
    },

    /// A field could not be coerced to the expected numeric type
    #[error("Mesh profile '{profile}' field '{field}' is not a valid {expected}: {value}")]
    InvalidNumber {
        /// The mesh section name.
        profile: String,
        /// The offending field.
        field: String,
        /// The expected numeric type.
        expected: &'static str,
        /// The raw value as reported by the host.
        value: String,
    },

    /// A point in the `points` matrix could not be parsed
    #[error("Mesh profile '{profile}' has an invalid point at row {row}, column {column}: '{value}'")]
    InvalidPoint {
        /// The mesh section name.
        profile: String,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// The raw token.
        value: String,
    },
}

/// Model error type
///
/// Represents failures that prevent the printer model from (re)initializing.
/// These are the only conditions surfaced to callers of `reinit`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A required key is absent from the full status snapshot
    #[error("Snapshot is missing required key '{key}'")]
    MissingKey {
        /// Dotted path of the missing key.
        key: String,
    },

    /// A configuration section is not a key/value mapping
    #[error("Configuration section '{section}' is not a mapping")]
    MalformedSection {
        /// The section name.
        section: String,
    },

    /// A bed mesh profile failed to parse
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Payload error type
///
/// Raised by the boundary decode step for host payloads. Steady-state
/// payload errors are logged and dropped by the model, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    /// The payload root is not a JSON object
    #[error("Payload is not a JSON object")]
    NotAnObject,

    /// A subsystem or device entry is not a JSON object
    #[error("Entry '{key}' is not a JSON object")]
    EntryNotAnObject {
        /// The offending key.
        key: String,
    },

    /// A required field is absent
    #[error("Payload is missing field '{field}'")]
    MissingField {
        /// The absent field.
        field: String,
    },

    /// The payload does not match the expected record shape
    #[error("Invalid payload: {reason}")]
    Invalid {
        /// Decoder message.
        reason: String,
    },
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        PayloadError::Invalid {
            reason: err.to_string(),
        }
    }
}

/// Control error type
///
/// Represents rejected direct user interactions with heater targets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The heater is not registered in the model
    #[error("Unknown heater: {heater}")]
    UnknownHeater {
        /// The heater name.
        heater: String,
    },

    /// The temperature step is not one of the configured deltas
    #[error("Unsupported temperature step: {delta}")]
    UnsupportedDelta {
        /// The requested step.
        delta: u32,
    },

    /// No heater is selected and the model has no tools
    #[error("No heater available")]
    NoHeater,

    /// Enter was pressed with nothing typed
    #[error("No temperature entered")]
    EmptyEntry,
}

/// Main error type for PrinterScreen
///
/// A unified error type that can represent any error from the core layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Model initialization error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Payload decode error
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Temperature control error
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error prevents the model from initializing
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Model(_))
    }

    /// Check if this is a payload error
    pub fn is_payload_error(&self) -> bool {
        matches!(self, Error::Payload(_))
    }
}

impl From<MeshError> for Error {
    fn from(err: MeshError) -> Self {
        Error::Model(ModelError::Mesh(err))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
