use crate::{CoreResult, StreamId};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Options applied when a capture stream is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Route captured audio back to local playback so the tab is not muted.
    pub audio_loopback: bool,
}

/// An open audio+video capture.
///
/// Encoded chunks arrive on `chunks` in order. The producer closes the
/// channel once the recorder has flushed after [`StreamControl::stop`].
pub struct CaptureStream {
    /// Encoded media chunks.
    pub chunks: mpsc::Receiver<Vec<u8>>,
    /// Controls for the underlying recorder.
    pub control: Box<dyn StreamControl>,
}

/// Native controls of the underlying media recorder.
#[async_trait]
pub trait StreamControl: Send {
    /// Stop emitting chunks until resumed.
    async fn pause(&mut self) -> CoreResult<()>;

    /// Continue emitting chunks.
    async fn resume(&mut self) -> CoreResult<()>;

    /// Flush remaining data and close the chunk channel.
    async fn stop(&mut self) -> CoreResult<()>;

    /// Release tracks and any playback loopback.
    async fn release(&mut self) -> CoreResult<()>;
}

/// Opens capture streams from platform-issued handles.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Open an audio+video capture bound to `stream_id`.
    ///
    /// Fails with `RecorderError::CaptureUnavailable` if the stream cannot
    /// be opened.
    async fn open(&self, stream_id: &StreamId, options: OpenOptions) -> CoreResult<CaptureStream>;
}
