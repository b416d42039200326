use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque capture-stream handle issued by the platform for one tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub String);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one capture opened by the surface. Completion reports carry
/// it so a late report cannot close a newer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureId(pub u64);

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coordinator -> capture surface instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum SurfaceCommand {
    /// Open the stream and start buffering.
    StartInSurface {
        /// Handle obtained from the platform.
        stream_id: StreamId,
        /// Wall-clock safety cap in seconds.
        #[serde(default)]
        duration: Option<u32>,
    },
    /// Finalize and save.
    StopInSurface,
    /// Pause the underlying recorder.
    PauseInSurface,
    /// Resume the underlying recorder.
    ResumeInSurface,
}

/// Capture surface -> coordinator reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfaceEvent {
    /// Capture finalized; the session may return to idle.
    SurfaceStopped,
    /// Capture ended abnormally after a successful start.
    SurfaceFailed {
        /// What went wrong.
        reason: String,
    },
}
