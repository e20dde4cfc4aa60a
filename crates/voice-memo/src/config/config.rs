//! Configuration management for voice-memo.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, range validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{AudioConfig, FeedbackConfig, HoldConfig, PromptConfig, StorageConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const CONFIG_FILE_NAME: &str = "config.toml";
const RECORDINGS_DIR_NAME: &str = "recordings";
const DEFAULT_RECORDING_FILE_NAME: &str = "default.wav";

/// Main configuration struct.
///
/// Every section falls back to its defaults when missing from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Press-and-hold timing.
    #[serde(default)]
    pub hold: HoldConfig,
    /// Audio device configuration.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Recording-started tone.
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Recording storage.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Prompt files for the tap zones.
    #[serde(default)]
    pub prompts: PromptConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `config_path`, writing defaults there if the
    /// file does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!(config_path = ?config_path, "No config found, creating default");
            let config = Config::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        if self.hold.duration_ms == 0 {
            return Err(AppError::ConfigError {
                reason: "hold.duration_ms must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.audio.block_size == 0 {
            return Err(AppError::ConfigError {
                reason: "audio.block_size must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !(0.0..=1.0).contains(&self.feedback.volume) {
            return Err(AppError::ConfigError {
                reason: format!(
                    "feedback.volume must be between 0.0 and 1.0, got {}",
                    self.feedback.volume
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Save configuration to `config_path` using the atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Directory holding the recording slot.
    #[track_caller]
    pub fn recordings_dir(&self) -> AppResult<PathBuf> {
        match &self.storage.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join(RECORDINGS_DIR_NAME)),
        }
    }

    /// Asset played when no recording exists yet.
    #[track_caller]
    pub fn default_recording_path(&self) -> AppResult<PathBuf> {
        match &self.storage.default_recording {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?
                .data_dir()
                .join(DEFAULT_RECORDING_FILE_NAME)),
        }
    }

    /// Scratch directory for files handed to the system player.
    #[track_caller]
    pub fn cache_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().to_path_buf())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "voice-memo", "Voice-Memo").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
