use error_location::ErrorLocation;
use thiserror::Error;

/// Recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Start was requested while a session is active.
    #[error("Recording is already in progress {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform reported no focused tab to record.
    #[error("No active tab found {location}")]
    NoActiveTab {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform could not hand back a capture stream for the tab.
    #[error("Capture unavailable: {reason} {location}")]
    CaptureUnavailable {
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform side (browser bridge) is not reachable.
    #[error("Platform unavailable: {reason} {location}")]
    PlatformUnavailable {
        /// Description of the platform failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The control overlay could not be attached to the tab.
    #[error("Overlay attach failed: {reason} {location}")]
    OverlayFailed {
        /// Description of the overlay failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An actor mailbox was closed before the message was handled.
    #[error("Channel closed: {message} {location}")]
    ChannelClosed {
        /// Human-readable error message.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the finished recording failed.
    #[error("Failed to save recording: {source} {location}")]
    SaveFailed {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl RecorderError {
    /// Text shown verbatim to the operator in a `{success: false, error}` reply.
    ///
    /// Unlike `Display`, this omits the source location.
    pub fn operator_message(&self) -> String {
        match self {
            RecorderError::AlreadyRecording { .. } => {
                "Recording is already in progress".to_string()
            }
            RecorderError::NoActiveTab { .. } => "No active tab found".to_string(),
            RecorderError::CaptureUnavailable { reason, .. } => {
                format!("Capture unavailable: {}", reason)
            }
            RecorderError::PlatformUnavailable { reason, .. } => {
                format!("Browser bridge unavailable: {}", reason)
            }
            RecorderError::OverlayFailed { reason, .. } => {
                format!("Failed to show recording controls: {}", reason)
            }
            RecorderError::ChannelClosed { message, .. } => message.clone(),
            RecorderError::SaveFailed { source, .. } => {
                format!("Failed to save recording: {}", source)
            }
        }
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
