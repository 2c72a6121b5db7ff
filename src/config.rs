//! Configuration file support for the annotation engine.
//!
//! This module provides serialization and deserialization of engine settings,
//! allowing users to export and import their configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::format::AutoSave;
use crate::model::DEFAULT_CREATOR;

/// Log level setting for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Creator recorded on annotations made in this session
    #[serde(default = "default_creator_name")]
    pub creator: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

fn default_creator_name() -> String {
    DEFAULT_CREATOR.to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Whether edits schedule an automatic save
    #[serde(default = "default_autosave_enabled")]
    pub autosave_enabled: bool,

    /// Seconds to wait after the last edit before auto-saving
    #[serde(default = "default_autosave_debounce_secs")]
    pub autosave_debounce_secs: u64,

    /// Minimum seconds between auto-saves
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Default export folder path
    #[serde(default)]
    pub export_folder: String,

    /// Default import folder path
    #[serde(default)]
    pub import_folder: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_autosave_enabled() -> bool {
    true
}

fn default_autosave_debounce_secs() -> u64 {
    AutoSave::DEFAULT_DEBOUNCE_DELAY.as_secs()
}

fn default_autosave_interval_secs() -> u64 {
    AutoSave::DEFAULT_SAVE_INTERVAL.as_secs()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            autosave_enabled: default_autosave_enabled(),
            autosave_debounce_secs: default_autosave_debounce_secs(),
            autosave_interval_secs: default_autosave_interval_secs(),
            export_folder: String::new(),
            import_folder: String::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl UserPreferences {
    /// Build an auto-save scheduler from these preferences.
    pub fn to_auto_save(&self) -> AutoSave {
        let saver = if self.autosave_enabled {
            AutoSave::new()
        } else {
            AutoSave::disabled()
        };
        saver
            .with_debounce_delay(Duration::from_secs(self.autosave_debounce_secs))
            .with_save_interval(Duration::from_secs(self.autosave_interval_secs))
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            creator: default_creator_name(),
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "anno-config.json"
    }

    /// Get the default config file path for auto-load/save.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("anno").join(Self::default_filename()))
        } else if let Some(home_dir) = dirs::home_dir() {
            Some(
                home_dir
                    .join(".config")
                    .join("anno")
                    .join(Self::default_filename()),
            )
        } else {
            None
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = EngineConfig::from_json(r#"{"version": 1}"#).unwrap();

        assert_eq!(config.creator, DEFAULT_CREATOR);
        assert!(config.preferences.autosave_enabled);
        assert_eq!(config.preferences.autosave_debounce_secs, 5);
        assert_eq!(config.preferences.autosave_interval_secs, 60);
        assert_eq!(config.preferences.log_level, LogLevel::Info);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        let error = EngineConfig::from_json(&json).unwrap_err();

        assert!(matches!(error, ConfigError::VersionTooNew { .. }));
    }

    #[test]
    fn test_round_trip() {
        let mut config = EngineConfig::new();
        config.creator = "alice".to_string();
        config.preferences.log_level = LogLevel::Debug;
        config.preferences.autosave_enabled = false;

        let restored = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored.creator, "alice");
        assert_eq!(restored.preferences.log_level, LogLevel::Debug);
        assert!(!restored.preferences.autosave_enabled);
    }

    #[test]
    fn test_disabled_preferences_build_disabled_auto_save() {
        let preferences = UserPreferences {
            autosave_enabled: false,
            ..UserPreferences::default()
        };

        assert!(!preferences.to_auto_save().is_enabled());
        assert!(UserPreferences::default().to_auto_save().is_enabled());
    }
}
