//! Object query and subscription requests
//!
//! The initial query fetches the objects needed by [`PrinterModel::reinit`];
//! the subscription asks the host to push the fields the model caches plus
//! per-tool telemetry.

use printerscreen_core::PrinterModel;
use serde_json::{Map, Value};

/// Objects requested by the initial status query, in request order
pub const INITIAL_QUERY_OBJECTS: [&str; 12] = [
    "bed_mesh",
    "idle_timeout",
    "configfile",
    "gcode_move",
    "fan",
    "toolhead",
    "virtual_sdcard",
    "print_stats",
    "heater_bed",
    "extruder",
    "pause_resume",
    "webhooks",
];

/// Fields subscribed per object
pub const SUBSCRIBED_FIELDS: [(&str, &[&str]); 11] = [
    ("bed_mesh", &["profile_name", "mesh_max", "mesh_min", "probed_matrix"]),
    ("configfile", &["config"]),
    ("fan", &["speed"]),
    (
        "gcode_move",
        &["extrude_factor", "gcode_position", "homing_origin", "speed_factor"],
    ),
    ("heater_bed", &["target", "temperature"]),
    ("idle_timeout", &["state"]),
    ("pause_resume", &["is_paused"]),
    (
        "print_stats",
        &["print_duration", "total_duration", "filament_used", "filename", "state", "message"],
    ),
    (
        "toolhead",
        &["homed_axes", "estimated_print_time", "print_time", "position", "extruder"],
    ),
    ("virtual_sdcard", &["file_position", "is_active", "progress"]),
    ("webhooks", &["state", "state_message"]),
];

/// Fields subscribed for every tool
pub const TOOL_FIELDS: [&str; 4] = ["target", "temperature", "pressure_advance", "smooth_time"];

/// Path of the initial object query
pub fn initial_query_path() -> String {
    format!("printer/objects/query?{}", INITIAL_QUERY_OBJECTS.join("&"))
}

/// Build the `printer.objects.subscribe` params for the model's tools
pub fn subscription_request(model: &PrinterModel) -> Value {
    let fields = |names: &[&str]| {
        Value::Array(names.iter().map(|name| Value::from(*name)).collect())
    };

    let mut objects: Map<String, Value> = SUBSCRIBED_FIELDS
        .iter()
        .map(|(object, names)| (object.to_string(), fields(*names)))
        .collect();
    for tool in model.get_tools() {
        objects.insert(tool.clone(), fields(TOOL_FIELDS.as_slice()));
    }

    let mut request = Map::new();
    request.insert("objects".to_string(), Value::Object(objects));
    Value::Object(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_query_path() {
        assert_eq!(
            initial_query_path(),
            "printer/objects/query?bed_mesh&idle_timeout&configfile&gcode_move&fan&toolhead\
             &virtual_sdcard&print_stats&heater_bed&extruder&pause_resume&webhooks"
        );
    }

    #[test]
    fn test_subscription_includes_tools() {
        let mut model = PrinterModel::new();
        model
            .reinit(
                "v1",
                &json!({"configfile": {"config": {"extruder": {}, "extruder1": {}}}}),
            )
            .unwrap();

        let request = subscription_request(&model);
        let objects = request["objects"].as_object().unwrap();
        assert_eq!(objects["webhooks"], json!(["state", "state_message"]));
        assert_eq!(
            objects["extruder1"],
            json!(["target", "temperature", "pressure_advance", "smooth_time"])
        );
        assert_eq!(objects.len(), 13);
    }
}
