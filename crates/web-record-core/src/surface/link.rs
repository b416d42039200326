use crate::{
    CaptureId, CaptureSurface, CoreResult, MediaSource, OpenOptions, RecorderError, RecordingSink,
    StreamId, SurfaceCommand, SurfaceLink, SurfaceReporter, surface::SurfaceRequest,
};

use std::{panic::Location, sync::Arc};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{info, instrument};

const SURFACE_MAILBOX_CAPACITY: usize = 32;

/// In-process [`SurfaceLink`] that spawns the [`CaptureSurface`] actor on
/// first use and respawns it if it has gone away.
pub struct LocalSurfaceLink {
    media: Arc<dyn MediaSource>,
    sink: Arc<dyn RecordingSink>,
    options: OpenOptions,
    reporter: SurfaceReporter,
    surface_tx: Mutex<Option<mpsc::Sender<SurfaceRequest>>>,
}

impl LocalSurfaceLink {
    /// Link whose surface opens streams from `media` and saves to `sink`.
    pub fn new(
        media: Arc<dyn MediaSource>,
        sink: Arc<dyn RecordingSink>,
        options: OpenOptions,
        reporter: SurfaceReporter,
    ) -> Self {
        Self {
            media,
            sink,
            options,
            reporter,
            surface_tx: Mutex::new(None),
        }
    }

    async fn sender(&self) -> CoreResult<mpsc::Sender<SurfaceRequest>> {
        self.surface_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| RecorderError::ChannelClosed {
                message: "Capture surface has not been created".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn deliver(&self, request: SurfaceRequest) -> CoreResult<()> {
        self.sender()
            .await?
            .send(request)
            .await
            .map_err(|_| RecorderError::ChannelClosed {
                message: "Capture surface is gone".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[async_trait]
impl SurfaceLink for LocalSurfaceLink {
    #[instrument(skip(self))]
    async fn ensure(&self) -> CoreResult<()> {
        let mut surface_tx = self.surface_tx.lock().await;

        if surface_tx.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel(SURFACE_MAILBOX_CAPACITY);
        let surface = CaptureSurface::new(
            Arc::clone(&self.media),
            Arc::clone(&self.sink),
            self.options,
            self.reporter.clone(),
            rx,
            tx.downgrade(),
        );
        tokio::spawn(surface.run());
        *surface_tx = Some(tx);

        info!("Capture surface created");

        Ok(())
    }

    async fn start(&self, stream_id: StreamId, duration: Option<u32>) -> CoreResult<CaptureId> {
        let (reply, reply_rx) = oneshot::channel();

        self.deliver(SurfaceRequest::Command {
            command: SurfaceCommand::StartInSurface {
                stream_id,
                duration,
            },
            reply: Some(reply),
        })
        .await?;

        reply_rx.await.map_err(|_| RecorderError::ChannelClosed {
            message: "Capture surface dropped the start reply".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?
    }

    async fn send(&self, command: SurfaceCommand) -> CoreResult<()> {
        self.deliver(SurfaceRequest::Command {
            command,
            reply: None,
        })
        .await
    }
}
