const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Format elapsed milliseconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let hours = elapsed_ms / MS_PER_HOUR;
    let minutes = (elapsed_ms / MS_PER_MINUTE) % 60;
    let seconds = (elapsed_ms / MS_PER_SECOND) % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
