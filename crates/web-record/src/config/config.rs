//! Configuration management for web-record.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{BridgeConfig, LoggingConfig, RecordingConfig, ServerConfig},
};

use web_record_core::{CoordinatorSettings, OpenOptions, PopupPanel};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::{ProjectDirs, UserDirs};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "web-record";
const APPLICATION: &str = "Web-Record";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Embedded web server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Recording behavior.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Browser bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
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

    /// Load configuration from `path`, writing defaults there if missing.
    #[track_caller]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, creating default");
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            debug!(config_dir = ?parent, "Created config directory");
        }

        let temp_path = path.with_extension("toml.tmp");

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

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// URL the browser extension and UI clients connect to.
    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.server.port)
    }

    /// Directory recordings are saved into.
    ///
    /// The configured directory wins; otherwise the user's downloads
    /// directory, falling back to `recordings` in the app data directory.
    #[track_caller]
    pub fn output_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.recording.output_dir {
            return Ok(dir.clone());
        }

        let downloads = UserDirs::new().and_then(|u| u.download_dir().map(Path::to_path_buf));
        if let Some(downloads) = downloads {
            return Ok(downloads);
        }

        Ok(Self::project_dirs()?.data_dir().join("recordings"))
    }

    /// Coordinator timing derived from the recording section.
    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            stop_timeout: self.recording.stop_timeout(),
            ..CoordinatorSettings::default()
        }
    }

    /// Options applied when a capture stream is opened.
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            audio_loopback: self.recording.audio_loopback,
        }
    }

    /// Popup prefilled with the configured mode and durations.
    pub fn popup_panel(&self) -> PopupPanel {
        PopupPanel::new(
            self.recording.default_mode,
            self.recording.timed_minutes,
            self.recording.max_minutes,
        )
    }

    /// Directory for rolling log files, if the platform has a data dir.
    pub fn log_dir() -> Option<PathBuf> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.data_dir().join("logs"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }
}
