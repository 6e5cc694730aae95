//! Application configuration.
//!
//! Settings are stored as versioned JSON: in the user's config directory on
//! native builds and in `localStorage` in the browser. A missing or invalid
//! file falls back to defaults with a warning.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_WINDOW_CENTER, DEFAULT_WINDOW_WIDTH, DEFAULT_ZOOM_PERCENT,
};
use crate::transform::Zoom;
use crate::window_level::WindowLevel;

/// Log level setting for the application.
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
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

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

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub viewer: ViewerDefaults,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Backend base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Default export folder path; empty means the working directory
    #[serde(default)]
    pub export_folder: String,

    /// Ask the backend for the model ensemble instead of the single model
    #[serde(default)]
    pub use_ensemble: bool,
}

fn default_api_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            api_base_url: default_api_base_url(),
            export_folder: String::new(),
            use_ensemble: false,
        }
    }
}

/// Initial display settings for newly opened images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerDefaults {
    #[serde(default = "default_window_width")]
    pub window_width: f32,

    #[serde(default = "default_window_center")]
    pub window_center: f32,

    #[serde(default = "default_zoom_percent")]
    pub zoom_percent: u32,
}

fn default_window_width() -> f32 {
    DEFAULT_WINDOW_WIDTH
}

fn default_window_center() -> f32 {
    DEFAULT_WINDOW_CENTER
}

fn default_zoom_percent() -> u32 {
    DEFAULT_ZOOM_PERCENT
}

impl Default for ViewerDefaults {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_center: default_window_center(),
            zoom_percent: default_zoom_percent(),
        }
    }
}

impl ViewerDefaults {
    /// Window/level with out-of-range values clamped.
    pub fn window_level(&self) -> WindowLevel {
        WindowLevel::new(self.window_width, self.window_center)
    }

    pub fn zoom(&self) -> Zoom {
        Zoom::new(self.zoom_percent)
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            viewer: ViewerDefaults::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "clinview-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("clinview").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("clinview")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load from `path`; `None` if missing or unreadable.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("📂 Loaded configuration from {:?}", path);
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

    /// Load from the default path, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Write to `path`, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("💾 Saved configuration to {:?}", path);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }

    /// LocalStorage key for WASM config persistence.
    #[cfg(target_arch = "wasm32")]
    const LOCALSTORAGE_KEY: &'static str = "clinview-config";

    /// Try to load configuration from localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;

        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("📂 Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {:?}", e);
                None
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save_to_local_storage(&self) -> Result<(), ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))?;

        let json = self.to_json()?;

        storage
            .set_item(Self::LOCALSTORAGE_KEY, &json)
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;

        log::info!("💾 Saved configuration to localStorage");
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// localStorage failure in the browser
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let mut config = AppConfig::new();
        config.preferences.api_base_url = "https://api.clinica.test".to_string();
        config.preferences.use_ensemble = true;
        config.viewer.zoom_percent = 150;

        let parsed = AppConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config.preferences, UserPreferences::default());
        assert_eq!(config.viewer.window_level(), WindowLevel::default());
        assert_eq!(config.viewer.zoom().percent(), 100);
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = AppConfig::from_json(r#"{"version": 2}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 2,
                supported_version: 1
            }
        ));
    }

    #[test]
    fn test_out_of_range_viewer_values_are_clamped() {
        let config =
            AppConfig::from_json(r#"{"version": 1, "viewer": {"window_width": 0, "zoom_percent": 1}}"#)
                .unwrap();
        assert_eq!(config.viewer.window_level().width(), 1.0);
        assert_eq!(config.viewer.zoom().percent(), 10);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
        assert_eq!(LogLevel::all().len(), 5);
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(AppConfig::default_filename());

        assert!(AppConfig::load_from(&path).is_none());

        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Trace;
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path), Some(config));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_invalid_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load_from(&path).is_none());
    }
}
