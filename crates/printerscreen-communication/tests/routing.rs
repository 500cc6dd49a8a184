use printerscreen_communication::*;
use printerscreen_core::{PowerStatus, PowerTopology, PrinterModel, PrinterState};
use serde_json::{json, Value};

fn notify(method: &str, params: Value) -> HostNotification {
    HostNotification::from_jsonrpc(&json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    }))
    .unwrap()
}

fn ready_model() -> PrinterModel {
    let mut model = PrinterModel::new();
    model
        .reinit(
            "v0.12.0",
            &json!({
                "configfile": {"config": {"extruder": {}, "heater_bed": {}}},
                "webhooks": {"state": "ready"},
                "idle_timeout": {"state": "Idle"},
                "print_stats": {"state": "standby"},
            }),
        )
        .unwrap();
    model
}

#[test]
fn test_klippy_connection_transitions() {
    let router = NotificationRouter::new();
    let mut model = ready_model();

    let outcome = router.route(&mut model, notify("notify_klippy_disconnected", json!([])));
    assert_eq!(outcome, RouteOutcome::Applied);
    assert_eq!(model.get_state(), PrinterState::Disconnected);

    router.route(&mut model, notify("notify_klippy_ready", json!([])));
    assert_eq!(model.get_state(), PrinterState::Ready);
}

#[test]
fn test_status_update_drives_state() {
    let router = NotificationRouter::new();
    let mut model = ready_model();

    router.route(
        &mut model,
        notify(
            "notify_status_update",
            json!([{
                "idle_timeout": {"state": "Printing"},
                "print_stats": {"state": "printing"},
                "extruder": {"temperature": 201.5},
            }, 4242.1]),
        ),
    );

    assert_eq!(model.get_state(), PrinterState::Printing);
    assert_eq!(model.get_dev_stats("extruder").unwrap().temperature, 201.5);
}

#[test]
fn test_status_update_ignored_while_shutdown() {
    let router = NotificationRouter::new();
    let mut model = ready_model();
    model.change_state(PrinterState::Shutdown);

    let outcome = router.route(
        &mut model,
        notify("notify_status_update", json!([{"webhooks": {"state": "ready"}}])),
    );

    assert_eq!(outcome, RouteOutcome::Ignored);
    assert_eq!(model.get_state(), PrinterState::Shutdown);
}

#[test]
fn test_gcode_shutdown_message() {
    let router = NotificationRouter::new();
    let mut model = ready_model();

    let outcome = router.route(
        &mut model,
        notify(
            "notify_gcode_response",
            json!(["// Klipper state: Shutdown"]),
        ),
    );

    assert_eq!(outcome, RouteOutcome::Applied);
    assert_eq!(model.get_state(), PrinterState::Shutdown);
}

#[test]
fn test_gcode_error_popup() {
    let router = NotificationRouter::new();
    let mut model = ready_model();

    let outcome = router.route(
        &mut model,
        notify("notify_gcode_response", json!(["!! Must home axis first: 0 0 0"])),
    );
    assert_eq!(outcome, RouteOutcome::Popup("Must home all axis first.".to_string()));

    let outcome = router.route(
        &mut model,
        notify("notify_gcode_response", json!(["!! Move out of range: 400 0 0"])),
    );
    assert_eq!(outcome, RouteOutcome::Popup("Move out of range: 400 0 0".to_string()));
}

#[test]
fn test_gcode_temperature_report_ignored() {
    let router = NotificationRouter::new();
    let mut model = ready_model();

    let outcome = router.route(
        &mut model,
        notify("notify_gcode_response", json!(["B:59.8 /60.0 T0:209.7 /210.0"])),
    );
    assert_eq!(outcome, RouteOutcome::Ignored);
}

#[test]
fn test_gcode_ignored_in_error_state() {
    let router = NotificationRouter::new();
    let mut model = ready_model();
    model.change_state(PrinterState::Error);

    let outcome = router.route(
        &mut model,
        notify("notify_gcode_response", json!(["!! Klipper state: Shutdown"])),
    );
    assert_eq!(outcome, RouteOutcome::Ignored);
    assert_eq!(model.get_state(), PrinterState::Error);
}

#[test]
fn test_power_changed() {
    let router = NotificationRouter::new();
    let mut model = ready_model();
    model.configure_power_devices(
        &PowerTopology::from_value(&json!({"devices": [{"device": "printer", "status": "off"}]}))
            .unwrap(),
    );

    let applied = router.route(
        &mut model,
        notify("notify_power_changed", json!([{"device": "printer", "status": "on"}])),
    );
    let ignored = router.route(
        &mut model,
        notify("notify_power_changed", json!([{"device": "lights", "status": "on"}])),
    );

    assert_eq!(applied, RouteOutcome::Applied);
    assert_eq!(ignored, RouteOutcome::Ignored);
    assert_eq!(model.get_power_device_status("printer"), Some(PowerStatus::On));
    assert_eq!(model.get_power_device_status("lights"), None);
}

#[test]
fn test_file_notifications_pass_through() {
    let router = NotificationRouter::new();
    let mut model = ready_model();

    let outcome = router.route(
        &mut model,
        notify("notify_metadata_update", json!([{"filename": "benchy.gcode"}])),
    );
    assert_eq!(
        outcome,
        RouteOutcome::MetadataUpdate {
            filename: "benchy.gcode".to_string()
        }
    );

    let change = json!({"action": "create_file", "item": {"path": "benchy.gcode"}});
    let outcome = router.route(&mut model, notify("notify_filelist_changed", json!([change])));
    assert_eq!(outcome, RouteOutcome::FilelistChanged(change));

    let outcome = router.route(&mut model, notify("notify_proc_stat_update", json!([{}])));
    assert_eq!(
        outcome,
        RouteOutcome::Unhandled {
            method: "notify_proc_stat_update".to_string()
        }
    );
}

#[test]
fn test_splash_for_routed_error() {
    let mut model = ready_model();
    NotificationRouter::new().route(
        &mut model,
        notify(
            "notify_status_update",
            json!([{"webhooks": {"state": "error", "state_message": "mcu 'mcu': Unable to connect; check micro-controller"}}]),
        ),
    );

    let message = model
        .get_stat_field(printerscreen_core::Subsystem::Webhooks, "state_message")
        .and_then(Value::as_str);
    assert_eq!(model.get_state(), PrinterState::Error);
    assert_eq!(
        splash_message(model.get_state(), message),
        Some("Klipper has encountered an error with the micro-controller.\nPlease recompile and flash.")
    );
}
