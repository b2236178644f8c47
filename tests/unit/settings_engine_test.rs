//! Integration-level tests for the SettingsEngine public API.
//!
//! Exercises default loading, persistence of single values, validation and
//! reset through the trait interface.

use scrollkeeper::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use scrollkeeper::types::errors::SettingsError;
use scrollkeeper::types::settings::{RestorationSettings, ScrollkeeperSettings};
use tempfile::TempDir;

/// Helper: a SettingsEngine backed by a temp directory the caller keeps alive.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, ScrollkeeperSettings::default());
    assert_eq!(settings.restoration.animation_duration_ms, 1600);
    assert_eq!(settings.restoration.storage_key_prefix, "scroll_position_");
}

#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("restoration.cooldown_ms", serde_json::json!(1200))
            .unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.restoration.cooldown_ms, 1200);
    assert_eq!(settings.restoration.monitor_window_ms, 10_000);
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "view_tracking": { "min_view_secs": 45 } }"#,
    )
    .unwrap();

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();

    assert_eq!(settings.view_tracking.min_view_secs, 45);
    assert_eq!(settings.view_tracking.recheck_ms, 10_000);
    assert_eq!(settings.restoration, RestorationSettings::default());
}

#[test]
fn test_corrupt_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ restoration: ").unwrap();

    let mut engine = engine_in_temp(&dir);
    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "restoration": { "monitor_window_ms": 500 } }"#,
    )
    .unwrap();

    let mut engine = engine_in_temp(&dir);
    assert!(matches!(engine.load(), Err(SettingsError::InvalidValue(_))));
}

#[test]
fn test_unknown_and_malformed_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    for key in ["restoration.nope", "", "restoration..cooldown_ms", "restoration"] {
        let result = engine.set_value(key, serde_json::json!(1));
        assert!(
            matches!(result, Err(SettingsError::InvalidKey(_))),
            "key {key:?} should be rejected"
        );
    }
    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn test_wrong_type_and_inconsistent_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let wrong_type = engine.set_value("restoration.cooldown_ms", serde_json::json!("slow"));
    assert!(matches!(wrong_type, Err(SettingsError::InvalidValue(_))));

    let negative = engine.set_value("restoration.drift_tolerance_px", serde_json::json!(-1.0));
    assert!(matches!(negative, Err(SettingsError::InvalidValue(_))));

    let below_grace = engine.set_value("restoration.cancel_after_ms", serde_json::json!(100));
    assert!(matches!(below_grace, Err(SettingsError::InvalidValue(_))));

    let no_reassert = engine.set_value("restoration.reassert_every_frames", serde_json::json!(0));
    assert!(matches!(no_reassert, Err(SettingsError::InvalidValue(_))));

    assert_eq!(engine.get_settings(), &ScrollkeeperSettings::default());
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine
        .set_value("restoration.storage_key_prefix", serde_json::json!("pos:"))
        .unwrap();
    engine
        .set_value("view_tracking.min_view_secs", serde_json::json!(10))
        .unwrap();

    engine.reset().unwrap();

    assert_eq!(engine.get_settings(), &ScrollkeeperSettings::default());
    let mut reloaded = engine_in_temp(&dir);
    assert_eq!(reloaded.load().unwrap(), ScrollkeeperSettings::default());
}
