//! Consolidated printer status summary.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::data::ConfigSection;

/// Config sections copied verbatim into the summary when present
pub const SUMMARY_SECTIONS: [&str; 3] = ["bed_mesh", "bltouch", "probe"];

/// A `{count}` entry of the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    /// Number of items
    pub count: usize,
}

/// Status aggregate consumed by the g-code and file layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterStatusSummary {
    /// Whether a `bltouch` section exists
    pub bltouch: bool,
    /// Whether a `probe` section exists
    pub probe: bool,
    /// Number of `gcode_macro ` sections
    pub gcode_macros: CountSummary,
    /// Number of known power devices
    pub power_devices: CountSummary,
    /// Copy of the cached `idle_timeout` fields
    pub idle_timeout: Map<String, Value>,
    /// Copy of the cached `pause_resume` fields
    pub pause_resume: Map<String, Value>,
    /// Copies of any present `bed_mesh`, `bltouch`, `probe` sections
    pub config_sections: BTreeMap<String, ConfigSection>,
}

impl PrinterStatusSummary {
    /// Render as `{"printer": {...}}`
    pub fn to_value(&self) -> Value {
        json!({ "printer": self })
    }
}
