use crate::bridge::{
    BridgeInbound, BridgeOp, BridgeRequest, CHUNK_QUEUE_CAPACITY, OUTBOUND_CAPACITY,
};

use web_record_core::{
    CaptureStream, CoordinatorEvent, CoordinatorHandle, CoreResult, MediaSource, OpenOptions,
    RecorderError, StreamControl, StreamId, TabId, TabPlatform, UiMessage,
};

use std::{collections::HashMap, panic::Location, sync::Arc, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// What the extension answered: a value, or the error it reported.
type ReplyResult = Result<Option<Value>, String>;

struct BridgeInner {
    coordinator: CoordinatorHandle,
    request_timeout: Duration,
    outbound: Mutex<Option<mpsc::Sender<BridgeRequest>>>,
    pending: Mutex<HashMap<Uuid, oneshot::Sender<ReplyResult>>>,
    capture_tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
}

/// Host side of the extension connection.
///
/// Implements [`TabPlatform`] and [`MediaSource`] by forwarding calls to
/// the attached extension. At most one extension is attached at a time;
/// calls made while none is attached fail with `PlatformUnavailable`.
#[derive(Clone)]
pub(crate) struct BrowserBridge {
    inner: Arc<BridgeInner>,
}

impl BrowserBridge {
    pub(crate) fn new(coordinator: CoordinatorHandle, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                coordinator,
                request_timeout,
                outbound: Mutex::new(None),
                pending: Mutex::new(HashMap::new()),
                capture_tx: Mutex::new(None),
            }),
        }
    }

    /// Claim the bridge for a new extension connection. Returns the queue
    /// of requests to write to that connection.
    pub(crate) async fn attach(&self) -> CoreResult<mpsc::Receiver<BridgeRequest>> {
        let mut outbound = self.inner.outbound.lock().await;

        if outbound.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(RecorderError::PlatformUnavailable {
                reason: "another extension is already connected".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        *outbound = Some(tx);

        info!("Browser extension connected");

        Ok(rx)
    }

    /// Release the bridge after the connection closed, handing back the
    /// queue from [`attach`](Self::attach). Outstanding requests fail and an
    /// open capture sees the end of its chunk stream.
    pub(crate) async fn detach(&self, requests: mpsc::Receiver<BridgeRequest>) {
        drop(requests);

        {
            let mut outbound = self.inner.outbound.lock().await;
            if !outbound.as_ref().is_some_and(|tx| tx.is_closed()) {
                // A newer connection already owns the bridge.
                return;
            }
            outbound.take();
        }

        let abandoned = {
            let mut pending = self.inner.pending.lock().await;
            let count = pending.len();
            pending.clear();
            count
        };

        if self.inner.capture_tx.lock().await.take().is_some() {
            warn!("Extension disconnected during capture, finalizing what was received");
        }

        info!(abandoned_requests = abandoned, "Browser extension disconnected");
    }

    /// Route a decoded text frame from the extension.
    pub(crate) async fn handle_inbound(&self, message: BridgeInbound) {
        match message {
            BridgeInbound::Reply { id, value, error } => {
                let Some(reply) = self.inner.pending.lock().await.remove(&id) else {
                    debug!(request_id = %id, "Reply for unknown or fire-and-forget request");
                    return;
                };
                let result = match error {
                    Some(reason) => Err(reason),
                    None => Ok(value),
                };
                let _ = reply.send(result);
            }
            BridgeInbound::TabRemoved { tab_id } => {
                // Spawned so the socket keeps reading replies the
                // coordinator may be waiting on.
                let coordinator = self.inner.coordinator.clone();
                tokio::spawn(async move {
                    let event = CoordinatorEvent::TabRemoved(tab_id);
                    if let Err(e) = coordinator.notify(event).await {
                        warn!(tab_id = %tab_id, error = %e, "Failed to report closed tab");
                    }
                });
            }
            BridgeInbound::CaptureEnded => {
                if self.inner.capture_tx.lock().await.take().is_some() {
                    debug!("Recorder flushed, chunk stream closed");
                }
            }
        }
    }

    /// Forward a binary media frame to the open capture.
    pub(crate) async fn handle_chunk(&self, chunk: Vec<u8>) {
        let capture_tx = self.inner.capture_tx.lock().await.clone();

        let Some(capture_tx) = capture_tx else {
            debug!(bytes = chunk.len(), "Media chunk without an open capture, dropped");
            return;
        };

        if capture_tx.send(chunk).await.is_err() {
            debug!("Capture surface no longer reading chunks");
        }
    }

    #[track_caller]
    fn unavailable(reason: impl Into<String>) -> RecorderError {
        RecorderError::PlatformUnavailable {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    async fn outbound(&self) -> CoreResult<mpsc::Sender<BridgeRequest>> {
        self.inner
            .outbound
            .lock()
            .await
            .clone()
            .ok_or_else(|| Self::unavailable("no browser extension connected"))
    }

    /// Send `op` and wait for the extension's answer.
    ///
    /// The outer error is transport failure (no extension, timeout); the
    /// inner one is an error the extension reported for the call itself.
    #[instrument(skip(self, op), fields(op = op.name()))]
    async fn request(&self, op: BridgeOp) -> CoreResult<ReplyResult> {
        let outbound = self.outbound().await?;
        let id = Uuid::new_v4();
        let name = op.name();

        let (reply_tx, reply_rx) = oneshot::channel();
        self.inner.pending.lock().await.insert(id, reply_tx);

        if outbound.send(BridgeRequest { id, op }).await.is_err() {
            self.inner.pending.lock().await.remove(&id);
            return Err(Self::unavailable("browser extension disconnected"));
        }

        match tokio::time::timeout(self.inner.request_timeout, reply_rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(Self::unavailable(format!(
                "browser extension disconnected before answering {}",
                name
            ))),
            Err(_) => {
                self.inner.pending.lock().await.remove(&id);
                Err(Self::unavailable(format!(
                    "browser extension did not answer {} within {}s",
                    name,
                    self.inner.request_timeout.as_secs()
                )))
            }
        }
    }

    /// Send `op` without waiting for an answer.
    async fn post(&self, op: BridgeOp) -> CoreResult<()> {
        let outbound = self.outbound().await?;
        outbound
            .send(BridgeRequest {
                id: Uuid::new_v4(),
                op,
            })
            .await
            .map_err(|_| Self::unavailable("browser extension disconnected"))
    }
}

#[async_trait]
impl TabPlatform for BrowserBridge {
    async fn active_tab(&self) -> CoreResult<Option<TabId>> {
        match self.request(BridgeOp::ActiveTab).await? {
            Ok(None) | Ok(Some(Value::Null)) => Ok(None),
            Ok(Some(value)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Self::unavailable(format!("malformed tab id: {}", e))),
            Err(reason) => Err(Self::unavailable(reason)),
        }
    }

    async fn capture_stream_id(&self, tab: TabId) -> CoreResult<StreamId> {
        match self.request(BridgeOp::StreamId { tab_id: tab }).await? {
            Ok(Some(Value::String(stream_id))) => Ok(StreamId(stream_id)),
            Ok(other) => Err(RecorderError::CaptureUnavailable {
                reason: format!("unexpected stream handle {:?}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(reason) => Err(RecorderError::CaptureUnavailable {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    async fn attach_overlay(&self, tab: TabId) -> CoreResult<()> {
        self.request(BridgeOp::AttachOverlay { tab_id: tab })
            .await?
            .map(|_| ())
            .map_err(|reason| RecorderError::OverlayFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn deliver(&self, tab: TabId, message: &UiMessage) -> CoreResult<()> {
        self.request(BridgeOp::DeliverToTab {
            tab_id: tab,
            message: *message,
        })
        .await?
        .map(|_| ())
        .map_err(Self::unavailable)
    }
}

#[async_trait]
impl MediaSource for BrowserBridge {
    #[instrument(skip(self))]
    async fn open(&self, stream_id: &StreamId, options: OpenOptions) -> CoreResult<CaptureStream> {
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE_CAPACITY);

        // Installed before the request so the first chunk has somewhere to go.
        *self.inner.capture_tx.lock().await = Some(chunk_tx);

        let opened = self
            .request(BridgeOp::OpenCapture {
                stream_id: stream_id.clone(),
                audio_loopback: options.audio_loopback,
            })
            .await;

        let failure = match opened {
            Ok(Ok(_)) => None,
            Ok(Err(reason)) => Some(reason),
            Err(e) => Some(e.operator_message()),
        };

        if let Some(reason) = failure {
            self.inner.capture_tx.lock().await.take();
            return Err(RecorderError::CaptureUnavailable {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(stream_id = %stream_id, "Capture opened in extension");

        Ok(CaptureStream {
            chunks: chunk_rx,
            control: Box::new(BridgeCapture {
                bridge: self.clone(),
            }),
        })
    }
}

/// Recorder controls forwarded to the extension.
///
/// Fire-and-forget: the socket task must stay free to deliver chunks while
/// the surface waits on these.
struct BridgeCapture {
    bridge: BrowserBridge,
}

#[async_trait]
impl StreamControl for BridgeCapture {
    async fn pause(&mut self) -> CoreResult<()> {
        self.bridge.post(BridgeOp::PauseCapture).await
    }

    async fn resume(&mut self) -> CoreResult<()> {
        self.bridge.post(BridgeOp::ResumeCapture).await
    }

    async fn stop(&mut self) -> CoreResult<()> {
        self.bridge.post(BridgeOp::StopCapture).await
    }

    async fn release(&mut self) -> CoreResult<()> {
        self.bridge.inner.capture_tx.lock().await.take();
        self.bridge.post(BridgeOp::ReleaseCapture).await
    }
}
