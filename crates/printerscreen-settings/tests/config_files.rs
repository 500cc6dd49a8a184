use printerscreen_settings::*;
use std::io::Write;
use tempfile::{tempdir, Builder};

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("screen.toml");

    let mut config = ScreenConfig::new();
    config.main.moonraker_host = "printer.local".to_string();
    config.main.moonraker_api_key = Some("secret".to_string());
    config.main.width = Some(800);
    config.temperature.max_extruder_temp = 285.0;
    config.save_to_file(&path).unwrap();

    let loaded = ScreenConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"main": {{"moonraker_port": 7126}}, "temperature": {{"deltas": [5, 15], "default_delta": 5}}}}"#
    )
    .unwrap();

    let config = ScreenConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.main.moonraker_port, 7126);
    assert_eq!(config.main.moonraker_host, "127.0.0.1");
    assert_eq!(config.temperature.deltas, vec![5, 15]);
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[temperature]\ndefault_delta = 3").unwrap();

    let err = ScreenConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, SettingsError::Config(ConfigError::InvalidSetting { .. })));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("screen.conf");
    std::fs::write(&path, "[main]").unwrap();

    let err = ScreenConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(ref ext)) if ext == "conf"
    ));
    assert!(ScreenConfig::new().save_to_file(&path).is_err());
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempdir().unwrap();
    let config = ScreenConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ScreenConfig::default());
}
