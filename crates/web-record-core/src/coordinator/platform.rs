use crate::{CaptureId, CoreResult, StreamId, SurfaceCommand, TabId, UiMessage};

use async_trait::async_trait;

/// Browser capabilities the coordinator depends on.
#[async_trait]
pub trait TabPlatform: Send + Sync {
    /// The focused tab of the current window, if any.
    async fn active_tab(&self) -> CoreResult<Option<TabId>>;

    /// Request a capture-stream handle for `tab`.
    ///
    /// Implementations report refusal as `RecorderError::CaptureUnavailable`.
    async fn capture_stream_id(&self, tab: TabId) -> CoreResult<StreamId>;

    /// Inject the in-page control overlay into `tab`.
    async fn attach_overlay(&self, tab: TabId) -> CoreResult<()>;

    /// Push a message to the overlay running in `tab`.
    async fn deliver(&self, tab: TabId, message: &UiMessage) -> CoreResult<()>;
}

/// Coordinator-side handle to the capture surface.
#[async_trait]
pub trait SurfaceLink: Send + Sync {
    /// Create the surface if it does not exist yet.
    async fn ensure(&self) -> CoreResult<()>;

    /// Begin capture and wait until the stream is open. Completion reports
    /// for this capture carry the returned id.
    ///
    /// An error means no completion report will ever follow.
    async fn start(&self, stream_id: StreamId, duration: Option<u32>) -> CoreResult<CaptureId>;

    /// Fire-and-forget instruction (stop, pause, resume).
    async fn send(&self, command: SurfaceCommand) -> CoreResult<()>;
}
