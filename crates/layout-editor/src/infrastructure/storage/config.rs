//! TOML-based configuration for the layout editor.
//!
//! Reads and writes `EditorConfig` at the platform-appropriate location:
//! - Windows:  `%APPDATA%\SignageLayout\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/signage-layout/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/SignageLayout/config.toml`
//!
//! ```toml
//! [editor]
//! log_level = "info"
//! drag_threshold_px = 5.0
//! default_zone_size = 20.0
//!
//! [api]
//! base_url = "http://localhost:8000/api"
//! timeout_secs = 15
//! auth_token = "..."
//!
//! [storage]
//! layouts_dir = "/var/lib/signage/layouts"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section or a
//! missing key all fall back to the values below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use layout_core::{DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_ZONE_SIZE, MIN_ZONE_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::edit_layout::SessionSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level editor configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EditorConfig {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Editing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorSection {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Pixels the pointer must travel before a press becomes a drag.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold_px: f64,
    /// Width and height of a newly dropped zone, in percent of the canvas.
    #[serde(default = "default_zone_size")]
    pub default_zone_size: f64,
}

/// Layout/catalog backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `Authorization: Bearer <token>` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Local layout storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StorageConfig {
    /// Directory for `<id>.json` layout files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layouts_dir: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_drag_threshold() -> f64 {
    DEFAULT_DRAG_THRESHOLD_PX
}
fn default_zone_size() -> f64 {
    DEFAULT_ZONE_SIZE
}
fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            drag_threshold_px: default_drag_threshold(),
            default_zone_size: default_zone_size(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            auth_token: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl EditorConfig {
    /// Session tunables, with out-of-range values pulled back to usable ones.
    pub fn session_settings(&self) -> SessionSettings {
        let threshold = self.editor.drag_threshold_px;
        let size = self.editor.default_zone_size;
        SessionSettings {
            drag_threshold_px: if threshold.is_finite() && threshold >= 0.0 {
                threshold
            } else {
                DEFAULT_DRAG_THRESHOLD_PX
            },
            default_zone_size: if size.is_finite() {
                size.clamp(MIN_ZONE_SIZE, 100.0)
            } else {
                DEFAULT_ZONE_SIZE
            },
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `EditorConfig` from the platform location, returning defaults if the
/// file does not yet exist.
pub fn load_config() -> Result<EditorConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `EditorConfig` from `path`, returning defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<EditorConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EditorConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform location.
pub fn save_config(config: &EditorConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating the parent directory if needed.
pub fn save_config_to(config: &EditorConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SignageLayout"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("signage-layout"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SignageLayout")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
