//! Recording coordinator.
//!
//! Owns the [`SessionState`] and handles commands one at a time. State is
//! set *before* the capture surface is instructed, so a query that arrives
//! during a cross-context round trip never sees a half-started session.

use crate::{
    CaptureMode, Clock, Command, CommandResponse, CoreResult, RecorderError, SessionState,
    StateSnapshot, SurfaceCommand, SurfaceEvent, SurfaceLink, TabId, TabPlatform, UiMessage,
    coordinator::{CoordinatorEvent, CoordinatorInbox, Envelope},
};

use std::{
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, instrument, warn};

/// Default interval between periodic state re-broadcasts.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default time to wait for the surface to confirm a stop.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the queue feeding the tab-delivery task. Overflowing
/// snapshots are dropped; the next tick supersedes them.
const TAB_OUTBOX_CAPACITY: usize = 16;

/// Timing knobs for the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorSettings {
    /// Interval of the background re-broadcast while recording.
    pub tick_interval: Duration,
    /// How long after Stop to wait for `SURFACE_STOPPED` before forcing idle.
    pub stop_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// Single owner of the recording session.
pub struct Coordinator {
    state: SessionState,
    platform: Arc<dyn TabPlatform>,
    surface: Arc<dyn SurfaceLink>,
    clock: Arc<dyn Clock>,
    settings: CoordinatorSettings,
    command_rx: mpsc::Receiver<Envelope>,
    events_rx: mpsc::Receiver<CoordinatorEvent>,
    updates_tx: broadcast::Sender<UiMessage>,
    tab_outbox: Option<mpsc::Sender<(TabId, UiMessage)>>,
    /// Armed by Stop; cleared by completion.
    stop_deadline: Option<Instant>,
}

impl Coordinator {
    /// Build a coordinator around the receiving side of
    /// [`CoordinatorHandle::channel`](crate::CoordinatorHandle::channel).
    pub fn new(
        inbox: CoordinatorInbox,
        platform: Arc<dyn TabPlatform>,
        surface: Arc<dyn SurfaceLink>,
        clock: Arc<dyn Clock>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            platform,
            surface,
            clock,
            settings,
            command_rx: inbox.command_rx,
            events_rx: inbox.events_rx,
            updates_tx: inbox.updates_tx,
            tab_outbox: None,
            stop_deadline: None,
        }
    }

    /// Run the command loop until shutdown or until every handle is dropped.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> CoreResult<()> {
        info!(
            tick_ms = self.settings.tick_interval.as_millis(),
            stop_timeout_ms = self.settings.stop_timeout.as_millis(),
            "Coordinator starting"
        );

        let forwarder = self.spawn_tab_forwarder();

        let mut tick = tokio::time::interval(self.settings.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        tick.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Coordinator shutting down");
                    break;
                }

                envelope = self.command_rx.recv() => {
                    let Some(Envelope { command, reply }) = envelope else {
                        info!("All coordinator handles dropped, shutting down");
                        break;
                    };
                    let response = self.handle_command(command).await;
                    if reply.send(response).is_err() {
                        debug!(command = ?command, "Requester went away before the reply");
                    }
                }

                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                }

                _ = tick.tick() => {
                    self.on_tick();
                }
            }
        }

        drop(self.tab_outbox.take());

        match tokio::time::timeout(Duration::from_secs(1), forwarder).await {
            Ok(Ok(())) => debug!("Tab forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Tab forwarder task panicked"),
            Err(_) => debug!("Tab forwarder did not stop within timeout"),
        }

        Ok(())
    }

    /// Sequential delivery of snapshots to the overlay in the target tab.
    fn spawn_tab_forwarder(&mut self) -> JoinHandle<()> {
        let (tab_tx, mut tab_rx) = mpsc::channel::<(TabId, UiMessage)>(TAB_OUTBOX_CAPACITY);
        self.tab_outbox = Some(tab_tx);

        let platform = Arc::clone(&self.platform);
        tokio::spawn(async move {
            while let Some((tab, message)) = tab_rx.recv().await {
                // No overlay listening is normal (page reloaded, tab closed).
                if let Err(e) = platform.deliver(tab, &message).await {
                    debug!(tab_id = %tab, error = %e, "Overlay delivery failed");
                }
            }
        })
    }

    async fn handle_command(&mut self, command: Command) -> CommandResponse {
        match command {
            Command::GetState => CommandResponse::State(self.snapshot()),
            Command::StartRecording { mode, duration } => {
                match self.start_recording(mode, duration).await {
                    Ok(()) => CommandResponse::ok(),
                    Err(e) => {
                        warn!(error = %e, "Failed to start recording");
                        CommandResponse::failed(e.operator_message())
                    }
                }
            }
            Command::StopRecording => {
                self.stop_recording().await;
                CommandResponse::ok()
            }
            Command::PauseRecording => {
                self.pause_recording().await;
                CommandResponse::ok()
            }
            Command::ResumeRecording => {
                self.resume_recording().await;
                CommandResponse::ok()
            }
        }
    }

    async fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::TabRemoved(tab) => {
                if self.state.target_tab() == Some(tab) {
                    info!(tab_id = %tab, "Recorded tab closed, stopping");
                    self.stop_recording().await;
                }
            }
            CoordinatorEvent::Surface { capture, event } => {
                if self.state.capture() != Some(capture) {
                    debug!(
                        capture = %capture,
                        event = ?event,
                        "Report for another capture ignored"
                    );
                    return;
                }
                if let SurfaceEvent::SurfaceFailed { reason } = &event {
                    error!(capture = %capture, reason = %reason, "Capture surface failed");
                }
                self.complete();
            }
        }
    }

    #[instrument(skip(self))]
    async fn start_recording(
        &mut self,
        mode: CaptureMode,
        duration: Option<u32>,
    ) -> CoreResult<()> {
        if self.state.is_recording() {
            return Err(RecorderError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let tab = self
            .platform
            .active_tab()
            .await?
            .ok_or_else(|| RecorderError::NoActiveTab {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let stream_id = self.platform.capture_stream_id(tab).await?;

        self.surface.ensure().await?;

        let duration = duration.filter(|secs| *secs > 0);
        self.state.begin(tab, mode, duration, self.clock.now());
        self.stop_deadline = None;
        self.broadcast();

        let capture = match self.surface.start(stream_id, duration).await {
            Ok(capture) => capture,
            Err(e) => {
                // No completion will follow a failed start; undo it here.
                self.state.finish();
                self.broadcast_to(Some(tab));
                return Err(match e {
                    RecorderError::CaptureUnavailable { .. } => e,
                    other => RecorderError::CaptureUnavailable {
                        reason: other.operator_message(),
                        location: ErrorLocation::from(Location::caller()),
                    },
                });
            }
        };
        self.state.bind_capture(capture);

        if let Err(e) = self.platform.attach_overlay(tab).await {
            warn!(tab_id = %tab, error = %e, "Recording without in-page controls");
        }

        info!(
            tab_id = %tab,
            capture = %capture,
            mode = %mode,
            duration = ?duration,
            "Recording started"
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop_recording(&mut self) {
        if !self.state.is_recording() {
            debug!("Stop ignored, not recording");
            return;
        }

        if let Err(e) = self.surface.send(SurfaceCommand::StopInSurface).await {
            warn!(error = %e, "Failed to instruct surface to stop");
        }

        if self.stop_deadline.is_none() {
            self.stop_deadline = self.clock.now().checked_add(self.settings.stop_timeout);
            if self.stop_deadline.is_none() {
                warn!(
                    stop_timeout_secs = self.settings.stop_timeout.as_secs(),
                    "Stop timeout out of range, waiting for the surface without a deadline"
                );
            }
        }

        info!("Stop requested, waiting for capture surface");
    }

    #[instrument(skip(self))]
    async fn pause_recording(&mut self) {
        if !matches!(self.state, SessionState::Recording { .. }) {
            debug!("Pause ignored, not actively recording");
            return;
        }

        if let Err(e) = self.surface.send(SurfaceCommand::PauseInSurface).await {
            warn!(error = %e, "Failed to instruct surface to pause");
        }

        self.state.pause(self.clock.now());
        self.broadcast();

        info!("Recording paused");
    }

    #[instrument(skip(self))]
    async fn resume_recording(&mut self) {
        if !self.state.is_paused() {
            debug!("Resume ignored, not paused");
            return;
        }

        if let Err(e) = self.surface.send(SurfaceCommand::ResumeInSurface).await {
            warn!(error = %e, "Failed to instruct surface to resume");
        }

        self.state.resume(self.clock.now());
        self.broadcast();

        info!("Recording resumed");
    }

    /// Completion: back to idle, telling the formerly recorded tab too.
    /// Callers check that a surface report belongs to the active capture.
    fn complete(&mut self) {
        let elapsed_ms = self.snapshot().elapsed_time;

        let Some(tab) = self.state.finish() else {
            debug!("Completion ignored, session already idle");
            return;
        };

        self.stop_deadline = None;
        self.broadcast_to(Some(tab));

        info!(tab_id = %tab, elapsed_ms, "Recording session closed");
    }

    fn on_tick(&mut self) {
        if let Some(deadline) = self.stop_deadline
            && self.clock.now() >= deadline
        {
            warn!(
                timeout_ms = self.settings.stop_timeout.as_millis(),
                "Capture surface never confirmed stop, forcing idle"
            );
            self.complete();
            return;
        }

        if self.state.is_recording() {
            self.broadcast();
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot(self.clock.now())
    }

    fn broadcast(&self) {
        self.broadcast_to(self.state.target_tab());
    }

    /// Push the projection to UI listeners and, if given, the tab overlay.
    /// Missing listeners and full queues are not errors.
    fn broadcast_to(&self, tab: Option<TabId>) {
        let message = UiMessage::StateUpdate {
            state: self.snapshot(),
        };

        let _ = self.updates_tx.send(message);

        if let (Some(tab), Some(outbox)) = (tab, &self.tab_outbox)
            && outbox.try_send((tab, message)).is_err()
        {
            debug!(tab_id = %tab, "Tab outbox full, dropping snapshot");
        }
    }
}
