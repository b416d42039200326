mod bridge_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod recording_config;
mod server_config;

pub(crate) use {
    bridge_config::BridgeConfig, config::Config, logging_config::LoggingConfig,
    recording_config::RecordingConfig, server_config::ServerConfig,
};

use web_record_core::CaptureMode;

pub(crate) const DEFAULT_PORT: u16 = 7878;
pub(crate) const DEFAULT_AUDIO_LOOPBACK: bool = true;
pub(crate) const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_TIMED_MINUTES: u32 = 5;
pub(crate) const DEFAULT_MAX_MINUTES: u32 = 60;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_LOG_FILE: bool = true;

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_audio_loopback() -> bool {
    DEFAULT_AUDIO_LOOPBACK
}

pub(crate) fn default_stop_timeout_secs() -> u64 {
    DEFAULT_STOP_TIMEOUT_SECS
}

pub(crate) fn default_mode() -> CaptureMode {
    CaptureMode::Always
}

pub(crate) fn default_timed_minutes() -> Option<u32> {
    Some(DEFAULT_TIMED_MINUTES)
}

pub(crate) fn default_max_minutes() -> Option<u32> {
    Some(DEFAULT_MAX_MINUTES)
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

pub(crate) fn default_log_file() -> bool {
    DEFAULT_LOG_FILE
}
