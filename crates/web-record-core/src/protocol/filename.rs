use chrono::{DateTime, SecondsFormat, Utc};

/// Prefix of every saved recording.
pub const RECORDING_PREFIX: &str = "web-record";

/// Container extension of every saved recording.
pub const RECORDING_EXTENSION: &str = "webm";

/// `web-record-<ISO 8601>.webm`, with `:` and `.` (invalid in filenames)
/// replaced by `-`.
pub fn recording_filename(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}-{}.{}", RECORDING_PREFIX, stamp, RECORDING_EXTENSION)
}
