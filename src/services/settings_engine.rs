// Scrollkeeper Settings Engine
// Loads, saves, updates and resets the restoration and view-tracking tunables.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ScrollkeeperSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ScrollkeeperSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ScrollkeeperSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// JSON-file backed settings.
pub struct SettingsEngine {
    config_path: String,
    settings: ScrollkeeperSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `<config dir>/settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: ScrollkeeperSettings::default(),
        }
    }

    /// Rejects combinations the restoration state machine cannot honor.
    pub fn validate(settings: &ScrollkeeperSettings) -> Result<(), SettingsError> {
        let r = &settings.restoration;
        if r.storage_key_prefix.is_empty() {
            return Err(SettingsError::InvalidValue(
                "restoration.storage_key_prefix must not be empty".to_string(),
            ));
        }
        if r.drift_tolerance_px.is_nan() || r.drift_tolerance_px < 0.0 {
            return Err(SettingsError::InvalidValue(format!(
                "restoration.drift_tolerance_px must be >= 0, got {}",
                r.drift_tolerance_px
            )));
        }
        if r.reassert_every_frames == 0 {
            return Err(SettingsError::InvalidValue(
                "restoration.reassert_every_frames must be at least 1".to_string(),
            ));
        }
        if r.monitor_window_ms < r.animation_duration_ms {
            return Err(SettingsError::InvalidValue(format!(
                "restoration.monitor_window_ms ({}) is shorter than the animation ({})",
                r.monitor_window_ms, r.animation_duration_ms
            )));
        }
        if r.cancel_after_ms < r.interaction_grace_ms {
            return Err(SettingsError::InvalidValue(format!(
                "restoration.cancel_after_ms ({}) is shorter than the interaction grace ({})",
                r.cancel_after_ms, r.interaction_grace_ms
            )));
        }
        if settings.view_tracking.min_view_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "view_tracking.min_view_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the config file. A missing file yields defaults; missing fields
    /// inside the file fall back to their defaults.
    fn load(&mut self) -> Result<ScrollkeeperSettings, SettingsError> {
        let path = Path::new(&self.config_path);
        if !path.exists() {
            tracing::debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = ScrollkeeperSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        let settings: ScrollkeeperSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &ScrollkeeperSettings {
        &self.settings
    }

    /// Updates one value addressed by a dot path such as
    /// `"restoration.cooldown_ms"`, validates the result and persists it.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(SettingsError::InvalidKey(format!("Malformed key '{}'", key)));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let pointer = format!("/{}", key.replace('.', "/"));
        let slot = tree
            .pointer_mut(&pointer)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        if slot.is_object() {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' names a group, not a value",
                key
            )));
        }
        *slot = value;

        let updated: ScrollkeeperSettings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        Self::validate(&updated)?;

        self.settings = updated;
        tracing::info!(key, "setting updated");
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ScrollkeeperSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
