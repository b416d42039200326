use web_record_core::{StreamId, TabId, UiMessage};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Host -> extension request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BridgeRequest {
    /// Correlates the reply.
    pub(crate) id: Uuid,
    /// What to do.
    #[serde(flatten)]
    pub(crate) op: BridgeOp,
}

/// Browser API calls the extension performs for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub(crate) enum BridgeOp {
    /// Focused tab of the current window. Replies with a tab id or null.
    ActiveTab,
    /// Capture-stream handle for a tab. Replies with the handle string.
    StreamId { tab_id: TabId },
    /// Inject the in-page controls.
    AttachOverlay { tab_id: TabId },
    /// Forward a push to the overlay in a tab.
    DeliverToTab { tab_id: TabId, message: UiMessage },
    /// Open the media recorder on a stream handle and start sending chunks.
    OpenCapture {
        stream_id: StreamId,
        audio_loopback: bool,
    },
    /// Pause the media recorder.
    PauseCapture,
    /// Resume the media recorder.
    ResumeCapture,
    /// Stop the recorder; remaining chunks follow, then `CAPTURE_ENDED`.
    StopCapture,
    /// Stop all tracks and the audio loopback.
    ReleaseCapture,
}

impl BridgeOp {
    /// Wire name, for logs.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            BridgeOp::ActiveTab => "ACTIVE_TAB",
            BridgeOp::StreamId { .. } => "STREAM_ID",
            BridgeOp::AttachOverlay { .. } => "ATTACH_OVERLAY",
            BridgeOp::DeliverToTab { .. } => "DELIVER_TO_TAB",
            BridgeOp::OpenCapture { .. } => "OPEN_CAPTURE",
            BridgeOp::PauseCapture => "PAUSE_CAPTURE",
            BridgeOp::ResumeCapture => "RESUME_CAPTURE",
            BridgeOp::StopCapture => "STOP_CAPTURE",
            BridgeOp::ReleaseCapture => "RELEASE_CAPTURE",
        }
    }
}

/// Extension -> host text frames. Binary frames carry media chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub(crate) enum BridgeInbound {
    /// Answer to a [`BridgeRequest`]. `error` set means the call failed.
    Reply {
        id: Uuid,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
    /// A browser tab was closed.
    TabRemoved { tab_id: TabId },
    /// The recorder flushed its last chunk.
    CaptureEnded,
}
