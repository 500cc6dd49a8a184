//! Routing of host notifications into the printer model

use printerscreen_core::{PrinterModel, PrinterState};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::notification::HostNotification;

/// Console text announcing a firmware shutdown
const SHUTDOWN_MARKER: &str = "Klipper state: Shutdown";

/// Prefix of firmware error lines shown to the user
const ERROR_PREFIX: &str = "!! ";

/// What a routed notification produced for the caller
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The model consumed the notification
    Applied,
    /// The notification was deliberately dropped
    Ignored,
    /// A firmware error message to show in a popup
    Popup(String),
    /// The file list changed; the payload is for the file layer
    FilelistChanged(Value),
    /// The file layer should re-request metadata for this file
    MetadataUpdate {
        /// The file whose metadata changed
        filename: String,
    },
    /// No route exists for the method
    Unhandled {
        /// The notification method
        method: String,
    },
}

/// Routes decoded notifications into a [`PrinterModel`]
#[derive(Debug, Default, Clone, Copy)]
pub struct NotificationRouter;

impl NotificationRouter {
    pub fn new() -> Self {
        Self
    }

    /// Apply one notification to the model
    pub fn route(&self, model: &mut PrinterModel, notification: HostNotification) -> RouteOutcome {
        match notification {
            HostNotification::KlippyDisconnected => {
                model.change_state(PrinterState::Disconnected);
                RouteOutcome::Applied
            }
            HostNotification::KlippyReady => {
                model.change_state(PrinterState::Ready);
                RouteOutcome::Applied
            }
            HostNotification::StatusUpdate(update) => {
                if model.get_state() == PrinterState::Shutdown {
                    tracing::trace!("Ignoring status update while shut down");
                    return RouteOutcome::Ignored;
                }
                model.apply_update(update);
                RouteOutcome::Applied
            }
            HostNotification::PowerChanged(record) => {
                tracing::debug!("Power status changed: {:?}", record);
                if model.process_power_update(&record) {
                    RouteOutcome::Applied
                } else {
                    RouteOutcome::Ignored
                }
            }
            HostNotification::GcodeResponse(line) => self.route_gcode_response(model, &line),
            HostNotification::FilelistChanged(payload) => {
                tracing::debug!("Filelist changed: {}", payload);
                RouteOutcome::FilelistChanged(payload)
            }
            HostNotification::MetadataUpdate { filename } => {
                RouteOutcome::MetadataUpdate { filename }
            }
            HostNotification::Other { method } => {
                tracing::trace!("No route for notification '{}'", method);
                RouteOutcome::Unhandled { method }
            }
        }
    }

    fn route_gcode_response(&self, model: &mut PrinterModel, line: &str) -> RouteOutcome {
        if matches!(
            model.get_state(),
            PrinterState::Error | PrinterState::Shutdown
        ) {
            return RouteOutcome::Ignored;
        }

        let mut outcome = RouteOutcome::Ignored;
        if line.contains(SHUTDOWN_MARKER) {
            model.change_state(PrinterState::Shutdown);
            outcome = RouteOutcome::Applied;
        }

        if is_temperature_report(line) {
            return outcome;
        }
        tracing::debug!("Console: {}", line);

        match line.strip_prefix(ERROR_PREFIX) {
            Some(message) => RouteOutcome::Popup(popup_text(message)),
            None => outcome,
        }
    }
}

/// Whether a console line is a periodic `B:<t> /<t> T<n>:<t>` report
pub fn is_temperature_report(line: &str) -> bool {
    static TEMPERATURE_REPORT: OnceLock<Regex> = OnceLock::new();
    let regex = TEMPERATURE_REPORT.get_or_init(|| {
        Regex::new(r"B:[0-9\.]+\s/[0-9\.]+\sT[0-9]+:[0-9\.]+").expect("invalid regex pattern")
    });
    line.starts_with("B:") && regex.is_match(line)
}

/// Normalize a firmware error message for display
pub fn popup_text(message: &str) -> String {
    if message.to_lowercase().contains("must home axis first") {
        "Must home all axis first.".to_string()
    } else {
        message.to_string()
    }
}
