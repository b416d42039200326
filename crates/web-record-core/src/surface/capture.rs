//! Capture surface actor.
//!
//! Holds at most one open [`CaptureStream`], buffers its chunks, and on
//! stop turns them into a saved file before reporting completion.

use crate::{
    CaptureId, ChunkBuffer, CoreResult, MediaSource, OpenOptions, RecorderError, RecordingSink,
    StreamControl, StreamId, SurfaceCommand, SurfaceEvent, SurfaceReporter, recording_filename,
};

use std::{panic::Location, sync::Arc, time::Duration};

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// How long to wait for the recorder to flush after stop.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Items in the surface mailbox.
#[derive(Debug)]
pub(crate) enum SurfaceRequest {
    /// Instruction from the coordinator; `reply` is set for start only.
    Command {
        command: SurfaceCommand,
        reply: Option<oneshot::Sender<CoreResult<CaptureId>>>,
    },
    /// The duration cap armed for capture `generation` fired.
    DurationElapsed { generation: u64 },
}

struct ActiveCapture {
    generation: u64,
    stream_id: StreamId,
    chunks: mpsc::Receiver<Vec<u8>>,
    control: Box<dyn StreamControl>,
    buffer: ChunkBuffer,
    cap_timer: Option<JoinHandle<()>>,
}

/// What happened on the active capture's chunk channel.
enum ChunkPoll {
    Chunk(Vec<u8>),
    Closed,
}

/// Isolated context that owns the media pipeline.
pub struct CaptureSurface {
    media: Arc<dyn MediaSource>,
    sink: Arc<dyn RecordingSink>,
    options: OpenOptions,
    reporter: SurfaceReporter,
    inbox: mpsc::Receiver<SurfaceRequest>,
    /// Weak so that pending cap timers do not keep the mailbox alive.
    self_tx: mpsc::WeakSender<SurfaceRequest>,
    active: Option<ActiveCapture>,
    generation: u64,
}

impl CaptureSurface {
    pub(crate) fn new(
        media: Arc<dyn MediaSource>,
        sink: Arc<dyn RecordingSink>,
        options: OpenOptions,
        reporter: SurfaceReporter,
        inbox: mpsc::Receiver<SurfaceRequest>,
        self_tx: mpsc::WeakSender<SurfaceRequest>,
    ) -> Self {
        Self {
            media,
            sink,
            options,
            reporter,
            inbox,
            self_tx,
            active: None,
            generation: 0,
        }
    }

    /// Run until every sender of the mailbox is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!(audio_loopback = self.options.audio_loopback, "Capture surface ready");

        loop {
            tokio::select! {
                request = self.inbox.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    self.handle_request(request).await;
                }

                poll = Self::next_chunk(&mut self.active) => {
                    match poll {
                        ChunkPoll::Chunk(chunk) => {
                            if let Some(active) = self.active.as_mut() {
                                active.buffer.push(chunk);
                            }
                        }
                        ChunkPoll::Closed => {
                            // The recorder ended on its own (track ended).
                            warn!("Capture stream closed without stop");
                            self.finish().await;
                        }
                    }
                }
            }
        }

        if self.active.is_some() {
            warn!("Capture surface closing with an active capture");
            self.finish().await;
        }

        info!("Capture surface stopped");
    }

    async fn next_chunk(active: &mut Option<ActiveCapture>) -> ChunkPoll {
        match active {
            Some(active) => match active.chunks.recv().await {
                Some(chunk) => ChunkPoll::Chunk(chunk),
                None => ChunkPoll::Closed,
            },
            None => std::future::pending().await,
        }
    }

    async fn handle_request(&mut self, request: SurfaceRequest) {
        match request {
            SurfaceRequest::Command { command, reply } => match command {
                SurfaceCommand::StartInSurface {
                    stream_id,
                    duration,
                } => {
                    let result = self.start(stream_id, duration).await;
                    if let Err(e) = &result {
                        error!(error = %e, "Failed to open capture");
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                SurfaceCommand::StopInSurface => self.finish().await,
                SurfaceCommand::PauseInSurface => self.pause().await,
                SurfaceCommand::ResumeInSurface => self.resume().await,
            },
            SurfaceRequest::DurationElapsed { generation } => {
                let is_current = self
                    .active
                    .as_ref()
                    .is_some_and(|active| active.generation == generation);
                if is_current {
                    info!(generation, "Duration cap reached, stopping");
                    self.finish().await;
                } else {
                    debug!(generation, "Stale duration cap ignored");
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn start(&mut self, stream_id: StreamId, duration: Option<u32>) -> CoreResult<CaptureId> {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let stream = self.media.open(&stream_id, self.options).await?;

        self.generation += 1;
        let generation = self.generation;

        let cap_timer = duration
            .filter(|secs| *secs > 0)
            .map(|secs| self.arm_duration_cap(generation, Duration::from_secs(u64::from(secs))));

        self.active = Some(ActiveCapture {
            generation,
            stream_id,
            chunks: stream.chunks,
            control: stream.control,
            buffer: ChunkBuffer::default(),
            cap_timer,
        });

        info!(generation, duration = ?duration, "Capture started");

        Ok(CaptureId(generation))
    }

    /// Wall-clock safety cap, independent of pause/resume.
    fn arm_duration_cap(&self, generation: u64, after: Duration) -> JoinHandle<()> {
        let self_tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(tx) = self_tx.upgrade() {
                let _ = tx.send(SurfaceRequest::DurationElapsed { generation }).await;
            }
        })
    }

    async fn pause(&mut self) {
        let Some(active) = self.active.as_mut() else {
            debug!("Pause ignored, no active capture");
            return;
        };
        if let Err(e) = active.control.pause().await {
            warn!(error = %e, "Recorder refused to pause");
        }
    }

    async fn resume(&mut self) {
        let Some(active) = self.active.as_mut() else {
            debug!("Resume ignored, no active capture");
            return;
        };
        if let Err(e) = active.control.resume().await {
            warn!(error = %e, "Recorder refused to resume");
        }
    }

    /// Stop, drain, release, save and report. A no-op without a capture.
    #[instrument(skip(self))]
    async fn finish(&mut self) {
        let Some(mut active) = self.active.take() else {
            debug!("Stop ignored, no active capture");
            return;
        };

        if let Some(timer) = active.cap_timer.take() {
            timer.abort();
        }

        if let Err(e) = active.control.stop().await {
            warn!(error = %e, "Recorder stop failed, saving what was buffered");
        }

        let deadline = tokio::time::Instant::now() + FLUSH_TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, active.chunks.recv()).await {
                Ok(Some(chunk)) => active.buffer.push(chunk),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        timeout_ms = FLUSH_TIMEOUT.as_millis(),
                        "Recorder did not flush in time, saving what was buffered"
                    );
                    break;
                }
            }
        }

        if let Err(e) = active.control.release().await {
            warn!(error = %e, "Failed to release capture stream");
        }

        if active.buffer.is_empty() {
            warn!(stream_id = %active.stream_id, "No media captured, saving empty recording");
        }

        let capture = CaptureId(active.generation);
        let chunk_count = active.buffer.len();
        let container = active.buffer.into_container();
        let filename = recording_filename(Utc::now());

        let event = match self.sink.save(&filename, &container).await {
            Ok(path) => {
                info!(
                    path = ?path,
                    chunk_count,
                    bytes = container.len(),
                    "Capture finalized"
                );
                SurfaceEvent::SurfaceStopped
            }
            Err(e) => {
                error!(error = %e, "Failed to save recording");
                SurfaceEvent::SurfaceFailed {
                    reason: e.operator_message(),
                }
            }
        };

        self.reporter.report(capture, event).await;
    }
}
