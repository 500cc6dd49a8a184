//! Printer state model
//!
//! [`PrinterModel`] owns the configuration snapshot, heater telemetry, tool
//! list, power devices and the derived operational state. It is
//! constructed by the process entry point and passed explicitly to the
//! layers that feed or read it.

mod printer;
mod summary;

pub use printer::PrinterModel;
pub use summary::{CountSummary, PrinterStatusSummary, SUMMARY_SECTIONS};
