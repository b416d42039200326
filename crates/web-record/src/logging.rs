use crate::{AppError, AppResult, config::Config, config::LoggingConfig};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "web_record=debug,web_record_core=debug";
const LOG_FILE_PREFIX: &str = "web-record";
const LOG_FILE_SUFFIX: &str = "log";

/// Install the global subscriber: human-readable stdout plus, when enabled,
/// a daily rolling JSON file. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
#[track_caller]
pub(crate) fn init(config: &LoggingConfig) -> AppResult<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut file_error = None;
    let (file_layer, guard) = match config.file.then(Config::log_dir).flatten() {
        Some(dir) => match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix(LOG_FILE_SUFFIX)
            .build(&dir)
        {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().json().with_writer(writer);
                (Some(layer), Some((guard, dir)))
            }
            Err(e) => {
                file_error = Some(e);
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if let Some(e) = file_error {
        warn!(error = %e, "File logging disabled, could not open log directory");
    }

    Ok(guard.map(|(guard, dir)| {
        debug!(log_dir = ?dir, "Writing logs to file");
        guard
    }))
}
