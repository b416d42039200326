use crate::config::{
    default_audio_loopback, default_max_minutes, default_mode, default_stop_timeout_secs,
    default_timed_minutes,
};

use web_record_core::CaptureMode;

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Recording behavior and popup defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Where recordings are saved. `None` uses the downloads directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Play captured audio back locally so the tab is not muted.
    #[serde(default = "default_audio_loopback")]
    pub audio_loopback: bool,
    /// Seconds to wait for the capture to finalize after stop.
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
    /// Mode preselected in the popup.
    #[serde(default = "default_mode")]
    pub default_mode: CaptureMode,
    /// Prefilled duration for timed mode, in minutes.
    #[serde(default = "default_timed_minutes")]
    pub timed_minutes: Option<u32>,
    /// Prefilled safety cap for always mode, in minutes.
    #[serde(default = "default_max_minutes")]
    pub max_minutes: Option<u32>,
}

impl RecordingConfig {
    /// Stop watchdog timeout as a `Duration`.
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            audio_loopback: default_audio_loopback(),
            stop_timeout_secs: default_stop_timeout_secs(),
            default_mode: default_mode(),
            timed_minutes: default_timed_minutes(),
            max_minutes: default_max_minutes(),
        }
    }
}
