//! Printer configuration snapshot
//!
//! The host reports its configuration as a mapping from section name to a
//! mapping of raw key/value pairs. This module keeps that mapping intact,
//! classifies the sections the model cares about, and coerces
//! `bed_mesh <profile>` sections into typed [`BedMeshProfile`] values.

use crate::error::{MeshError, ModelError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw key/value pairs of one configuration section
pub type ConfigSection = Map<String, Value>;

/// Prefix shared by tool sections (`extruder`, `extruder1`, ...)
pub const EXTRUDER_PREFIX: &str = "extruder";
/// Prefix of extruder steppers, which are not tools
pub const EXTRUDER_STEPPER_PREFIX: &str = "extruder_stepper";
/// Prefix of bed heater sections
pub const HEATER_BED_PREFIX: &str = "heater_bed";
/// Prefix of sectioned mesh profiles (note the trailing space)
pub const BED_MESH_PROFILE_PREFIX: &str = "bed_mesh ";
/// Prefix of g-code macro sections
pub const GCODE_MACRO_PREFIX: &str = "gcode_macro ";
/// Key marking a tool that shares another tool's heater
pub const SHARED_HEATER_KEY: &str = "shared_heater";

/// Whether a section name denotes a tool
pub fn is_tool_section(name: &str) -> bool {
    name.starts_with(EXTRUDER_PREFIX) && !name.starts_with(EXTRUDER_STEPPER_PREFIX)
}

/// Whether a section name denotes a bed heater
pub fn is_bed_heater_section(name: &str) -> bool {
    name.starts_with(HEATER_BED_PREFIX)
}

/// Whether a section name denotes a bed mesh profile
pub fn is_mesh_profile_section(name: &str) -> bool {
    name.starts_with(BED_MESH_PROFILE_PREFIX)
}

/// A typed bed mesh profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedMeshProfile {
    /// Probe points along X
    pub x_count: u32,
    /// Probe points along Y
    pub y_count: u32,
    /// Minimum X of the probed area
    pub min_x: f64,
    /// Maximum X of the probed area
    pub max_x: f64,
    /// Minimum Y of the probed area
    pub min_y: f64,
    /// Maximum Y of the probed area
    pub max_y: f64,
    /// Probed Z offsets; one inner vector per mesh row, in source order
    pub points: Vec<Vec<f64>>,
}

impl BedMeshProfile {
    /// Parse a profile from its raw configuration section
    ///
    /// Counts must be non-negative integers, bounds must be floats, and
    /// `points` is a newline-separated list of comma-separated floats.
    /// Already-coerced values (JSON numbers and arrays) are accepted too.
    pub fn parse(profile: &str, section: &ConfigSection) -> Result<Self, MeshError> {
        Ok(Self {
            x_count: parse_count(profile, section, "x_count")?,
            y_count: parse_count(profile, section, "y_count")?,
            min_x: parse_float(profile, section, "min_x")?,
            max_x: parse_float(profile, section, "max_x")?,
            min_y: parse_float(profile, section, "min_y")?,
            max_y: parse_float(profile, section, "max_y")?,
            points: parse_points(profile, section)?,
        })
    }

    /// Overwrite the raw section fields with their coerced values
    pub fn write_back(&self, section: &mut ConfigSection) {
        section.insert("x_count".to_string(), Value::from(self.x_count));
        section.insert("y_count".to_string(), Value::from(self.y_count));
        section.insert("min_x".to_string(), Value::from(self.min_x));
        section.insert("max_x".to_string(), Value::from(self.max_x));
        section.insert("min_y".to_string(), Value::from(self.min_y));
        section.insert("max_y".to_string(), Value::from(self.max_y));
        let rows = self
            .points
            .iter()
            .map(|row| Value::Array(row.iter().copied().map(Value::from).collect()))
            .collect();
        section.insert("points".to_string(), Value::Array(rows));
    }
}

fn required<'a>(
    profile: &str,
    section: &'a ConfigSection,
    field: &str,
) -> Result<&'a Value, MeshError> {
    section.get(field).ok_or_else(|| MeshError::MissingField {
        profile: profile.to_string(),
        field: field.to_string(),
    })
}

fn parse_count(profile: &str, section: &ConfigSection, field: &str) -> Result<u32, MeshError> {
    let value = required(profile, section, field)?;
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    parsed.ok_or_else(|| MeshError::InvalidNumber {
        profile: profile.to_string(),
        field: field.to_string(),
        expected: "integer",
        value: raw_text(value),
    })
}

fn parse_float(profile: &str, section: &ConfigSection, field: &str) -> Result<f64, MeshError> {
    let value = required(profile, section, field)?;
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| MeshError::InvalidNumber {
        profile: profile.to_string(),
        field: field.to_string(),
        expected: "float",
        value: raw_text(value),
    })
}

fn parse_points(profile: &str, section: &ConfigSection) -> Result<Vec<Vec<f64>>, MeshError> {
    let invalid = |row: usize, column: usize, value: String| MeshError::InvalidPoint {
        profile: profile.to_string(),
        row,
        column,
        value,
    };

    match required(profile, section, "points")? {
        Value::String(text) => text
            .trim()
            .split('\n')
            .enumerate()
            .map(|(row, line)| {
                line.split(',')
                    .enumerate()
                    .map(|(column, token)| {
                        let token = token.trim();
                        token
                            .parse::<f64>()
                            .map_err(|_| invalid(row, column, token.to_string()))
                    })
                    .collect::<Result<Vec<f64>, MeshError>>()
            })
            .collect(),
        Value::Array(rows) => rows
            .iter()
            .enumerate()
            .map(|(row, line)| {
                let cells = line
                    .as_array()
                    .ok_or_else(|| invalid(row, 0, line.to_string()))?;
                cells
                    .iter()
                    .enumerate()
                    .map(|(column, cell)| {
                        cell.as_f64()
                            .ok_or_else(|| invalid(row, column, cell.to_string()))
                    })
                    .collect::<Result<Vec<f64>, MeshError>>()
            })
            .collect(),
        other => Err(MeshError::InvalidNumber {
            profile: profile.to_string(),
            field: "points".to_string(),
            expected: "point matrix",
            value: other.to_string(),
        }),
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Immutable-after-load configuration snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrinterConfig {
    sections: BTreeMap<String, ConfigSection>,
    mesh_profiles: BTreeMap<String, BedMeshProfile>,
}

impl PrinterConfig {
    /// Build a configuration from the host's `configfile.config` mapping
    ///
    /// Every section must be a mapping. Mesh profile sections are coerced;
    /// any malformed numeric field fails the whole load.
    pub fn from_value(config: &Value) -> Result<Self, ModelError> {
        let raw = config.as_object().ok_or_else(|| ModelError::MissingKey {
            key: "configfile.config".to_string(),
        })?;

        let mut sections = BTreeMap::new();
        let mut mesh_profiles = BTreeMap::new();
        for (name, value) in raw {
            let mut section = value
                .as_object()
                .cloned()
                .ok_or_else(|| ModelError::MalformedSection {
                    section: name.clone(),
                })?;

            if is_mesh_profile_section(name) {
                let profile = BedMeshProfile::parse(name, &section)?;
                profile.write_back(&mut section);
                mesh_profiles.insert(name.clone(), profile);
            }
            sections.insert(name.clone(), section);
        }

        Ok(Self {
            sections,
            mesh_profiles,
        })
    }

    /// Whether a section with exactly this name exists
    pub fn contains(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Look up a section by exact name
    pub fn section(&self, section: &str) -> Option<&ConfigSection> {
        self.sections.get(section)
    }

    /// Names of all sections starting with `prefix`, in name order
    pub fn section_names(&self, prefix: &str) -> Vec<&str> {
        self.sections
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Iterate over all section names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Look up a parsed mesh profile by its full section name
    pub fn mesh_profile(&self, section: &str) -> Option<&BedMeshProfile> {
        self.mesh_profiles.get(section)
    }

    /// All parsed mesh profiles keyed by section name
    pub fn mesh_profiles(&self) -> &BTreeMap<String, BedMeshProfile> {
        &self.mesh_profiles
    }

    /// Whether a section declares a shared heater
    pub fn has_shared_heater(&self, section: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| s.contains_key(SHARED_HEATER_KEY))
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the configuration has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mesh_section() -> ConfigSection {
        json!({
            "x_count": "3",
            "y_count": "2",
            "min_x": "10.0",
            "max_x": "200",
            "min_y": "15.5",
            "max_y": "190.25",
            "points": "\n  0.1, 0.2, 0.3\n  -0.05, 0.0, 0.15\n",
            "version": "1"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_section_classification() {
        assert!(is_tool_section("extruder"));
        assert!(is_tool_section("extruder1"));
        assert!(!is_tool_section("extruder_stepper belt"));
        assert!(!is_tool_section("heater_bed"));
        assert!(is_bed_heater_section("heater_bed"));
        assert!(is_mesh_profile_section("bed_mesh default"));
        assert!(!is_mesh_profile_section("bed_mesh"));
    }

    #[test]
    fn test_mesh_profile_parse() {
        let profile = BedMeshProfile::parse("bed_mesh default", &mesh_section()).unwrap();
        assert_eq!(profile.x_count, 3);
        assert_eq!(profile.y_count, 2);
        assert_eq!(profile.min_x, 10.0);
        assert_eq!(profile.max_y, 190.25);
        assert_eq!(
            profile.points,
            vec![vec![0.1, 0.2, 0.3], vec![-0.05, 0.0, 0.15]]
        );
    }

    #[test]
    fn test_mesh_profile_rejects_bad_count() {
        let mut section = mesh_section();
        section.insert("x_count".to_string(), json!("3.5"));
        let err = BedMeshProfile::parse("bed_mesh default", &section).unwrap_err();
        assert!(matches!(err, MeshError::InvalidNumber { ref field, .. } if field == "x_count"));
    }

    #[test]
    fn test_mesh_profile_rejects_bad_point() {
        let mut section = mesh_section();
        section.insert("points".to_string(), json!("0.1, 0.2\n0.3, abc"));
        let err = BedMeshProfile::parse("bed_mesh default", &section).unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidPoint {
                profile: "bed_mesh default".to_string(),
                row: 1,
                column: 1,
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_mesh_profile_missing_field() {
        let mut section = mesh_section();
        section.remove("min_y");
        let err = BedMeshProfile::parse("bed_mesh default", &section).unwrap_err();
        assert!(matches!(err, MeshError::MissingField { ref field, .. } if field == "min_y"));
    }

    #[test]
    fn test_write_back_is_reparseable() {
        let profile = BedMeshProfile::parse("bed_mesh default", &mesh_section()).unwrap();
        let mut section = mesh_section();
        profile.write_back(&mut section);
        assert_eq!(section["x_count"], json!(3));
        assert_eq!(section["points"][1][2], json!(0.15));
        assert_eq!(
            BedMeshProfile::parse("bed_mesh default", &section).unwrap(),
            profile
        );
    }

    #[test]
    fn test_config_from_value() {
        let config = PrinterConfig::from_value(&json!({
            "extruder": {"nozzle_diameter": "0.4"},
            "extruder1": {"shared_heater": "extruder"},
            "bed_mesh default": mesh_section(),
            "gcode_macro PRINT_START": {"gcode": ""},
        }))
        .unwrap();

        assert_eq!(config.len(), 4);
        assert!(config.has_shared_heater("extruder1"));
        assert!(!config.has_shared_heater("extruder"));
        assert_eq!(config.section_names("extruder"), vec!["extruder", "extruder1"]);
        assert!(config.mesh_profile("bed_mesh default").is_some());
        assert_eq!(config.section("bed_mesh default").unwrap()["y_count"], json!(2));
    }

    #[test]
    fn test_config_rejects_non_mapping_section() {
        let err = PrinterConfig::from_value(&json!({"printer": "cartesian"})).unwrap_err();
        assert_eq!(
            err,
            ModelError::MalformedSection {
                section: "printer".to_string()
            }
        );
    }
}
