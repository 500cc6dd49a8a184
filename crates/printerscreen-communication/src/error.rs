//! Error types for host notification decoding

use printerscreen_core::PayloadError;
use thiserror::Error;

/// Notification decode error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// The message is not a JSON object
    #[error("Notification is not a JSON object")]
    NotAnObject,

    /// The message has no string `method`
    #[error("Notification has no method")]
    MissingMethod,

    /// The method requires a payload but `params` is empty or absent
    #[error("Notification '{method}' has no params")]
    MissingParams {
        /// The notification method.
        method: String,
    },

    /// The payload does not have the shape the method requires
    #[error("Notification '{method}' has invalid params: {reason}")]
    InvalidParams {
        /// The notification method.
        method: String,
        /// Decoder message.
        reason: String,
    },

    /// The payload failed the typed decode step
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Result type for notification decoding
pub type Result<T> = std::result::Result<T, NotificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::MissingParams {
            method: "notify_power_changed".to_string(),
        };
        assert_eq!(err.to_string(), "Notification 'notify_power_changed' has no params");

        let err: NotificationError = PayloadError::NotAnObject.into();
        assert_eq!(err.to_string(), "Payload is not a JSON object");
    }
}
