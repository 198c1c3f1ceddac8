//! Configuration file support for Thermark.
//!
//! Settings are stored as versioned JSON. Every field has a default so that
//! older or partial files keep loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thermark_render::{Colormap, RasterOptions};

use crate::constants::{SUMMARY_REFRESH_MS, ZOOM_DEBOUNCE_MS};
use crate::session::SessionSettings;
use crate::viewport::ZoomConfig;

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
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
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

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Folder receiving exported images
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Folder receiving generated reports
    #[serde(default = "default_output_dir")]
    pub report_dir: PathBuf,

    #[serde(default)]
    pub colormap: Colormap,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Program used for metadata extraction
    #[serde(default = "default_exiftool_program")]
    pub exiftool_program: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_exiftool_program() -> String {
    "exiftool".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            report_dir: default_output_dir(),
            colormap: Colormap::default(),
            log_level: LogLevel::default(),
            exiftool_program: default_exiftool_program(),
        }
    }
}

/// Zoom and refresh timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub zoom_debounce_ms: u64,
    pub summary_refresh_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        let zoom = ZoomConfig::default();
        Self {
            zoom_in_factor: zoom.zoom_in_factor,
            zoom_out_factor: zoom.zoom_out_factor,
            zoom_debounce_ms: ZOOM_DEBOUNCE_MS,
            summary_refresh_ms: SUMMARY_REFRESH_MS,
        }
    }
}

/// Raster export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output pixels per data unit (sample)
    pub pixels_per_unit: f32,
    /// Output pixels per point for line widths and text
    pub pixels_per_point: f32,
    /// Draw a colorbar next to the image
    pub colorbar: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let raster = RasterOptions::default();
        Self {
            pixels_per_unit: raster.pixels_per_unit,
            pixels_per_point: raster.pixels_per_point,
            colorbar: true,
        }
    }
}

impl ExportConfig {
    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            pixels_per_unit: self.pixels_per_unit,
            pixels_per_point: self.pixels_per_point,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            viewport: ViewportConfig::default(),
            export: ExportConfig::default(),
        }
    }

    /// Session tunables derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            zoom: ZoomConfig {
                zoom_in_factor: self.viewport.zoom_in_factor,
                zoom_out_factor: self.viewport.zoom_out_factor,
            },
            zoom_debounce: Duration::from_millis(self.viewport.zoom_debounce_ms),
            summary_refresh: Duration::from_millis(self.viewport.summary_refresh_ms),
            colormap: self.preferences.colormap,
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

    pub fn default_filename() -> &'static str {
        "thermark-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("thermark").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("thermark")
                    .join(Self::default_filename())
            })
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write the configuration, creating parent directories if needed.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
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
    fn test_default_config_roundtrip() {
        let mut config = AppConfig::new();
        config.preferences.colormap = Colormap::Inferno;
        config.export.colorbar = false;
        let json = config.to_json().unwrap();
        assert!(json.contains("\"inferno\""));
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1, "viewport": {"zoom_debounce_ms": 80}}"#)
            .unwrap();
        assert_eq!(config.viewport.zoom_debounce_ms, 80);
        assert_eq!(config.viewport.summary_refresh_ms, SUMMARY_REFRESH_MS);
        assert_eq!(config.preferences.exiftool_program, "exiftool");
        assert!(config.export.colorbar);

        let settings = config.session_settings();
        assert_eq!(settings.zoom_debounce, Duration::from_millis(80));
        assert_eq!(settings.colormap, Colormap::Magma);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        let result = AppConfig::from_json(&json);
        assert!(matches!(result, Err(ConfigError::VersionTooNew { .. })));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AppConfig::from_json("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_and_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(AppConfig::default_filename());
        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.save_to_path(&path).unwrap();

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.preferences.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("chatty".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.name(), "Trace");
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = AppConfig::default_path() {
            assert!(path.ends_with("thermark/thermark-config.json"));
        }
    }
}
