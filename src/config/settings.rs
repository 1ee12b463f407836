//! Application settings and configuration file management

use crate::audio::AudioError;
use crate::config::iso_duration;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const LOG_TARGET: &str = "jiho::config::settings";

/// Contents written to a freshly created configuration file.
pub const INITIAL_CONFIG: &str = "{}";

/// Application settings, as stored in `config.json`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sound file to play. The bundled chime is used when unset or missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_source: Option<PathBuf>,
    /// Fixed wait per repetition, ISO-8601 (e.g. "PT2S"). Measured from the clip when unset.
    #[serde(default, with = "iso_duration::option", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Playback volume, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    /// ALSA device to use for audio playback
    #[serde(default = "default_alsa_device")]
    pub alsa_device: String,
}

fn default_alsa_device() -> String {
    "default".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sound_source: None,
            duration: None,
            volume: None,
            alsa_device: default_alsa_device(),
        }
    }
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
    /// Neither the configured nor the bundled sound source is playable.
    SourceError(AudioError),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<AudioError> for ConfigError {
    fn from(err: AudioError) -> Self {
        ConfigError::SourceError(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
            ConfigError::SourceError(e) => write!(f, "Sound source error: {}", e),
        }
    }
}

impl Error for ConfigError {}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Creates the configuration file with empty settings if it does not exist yet.
    /// Returns whether a file was created.
    pub fn ensure_exists(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, INITIAL_CONFIG)?;
        info!(target: LOG_TARGET, "Created initial configuration file at {}", path.display());
        Ok(true)
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("jiho").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(volume) = self.volume {
            if !volume.is_finite() {
                return Err(ConfigError::ValidationError(format!("Volume must be a finite number, got {}", volume)));
            }
        }

        if self.duration == Some(Duration::ZERO) {
            return Err(ConfigError::ValidationError("Duration must be greater than zero".to_string()));
        }

        if self.alsa_device.is_empty() {
            return Err(ConfigError::ValidationError("ALSA device cannot be empty".to_string()));
        }

        Ok(())
    }
}
