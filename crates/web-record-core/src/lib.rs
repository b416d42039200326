//! Web-Record Core Library
//!
//! Session state machine, wire protocol and actors for recording a browser
//! tab. Three contexts cooperate through messages:
//!
//! - the [`Coordinator`] owns the [`SessionState`] and validates commands,
//! - the [`CaptureSurface`] holds the media pipeline and writes the file,
//! - the control surfaces ([`PageOverlay`], [`PopupPanel`]) mirror state.
//!
//! Platform capabilities (tab lookup, stream handles, media chunks) are
//! reached through the [`TabPlatform`] and [`MediaSource`] traits.
//!
//! # Example
//!
//! ```no_run
//! use web_record_core::{
//!     Command, Coordinator, CoordinatorHandle, CoordinatorSettings, CoreResult, TabPlatform,
//!     TokioClock,
//! };
//!
//! use std::sync::Arc;
//!
//! async fn record(
//!     platform: Arc<dyn TabPlatform>,
//!     surface: Arc<dyn web_record_core::SurfaceLink>,
//! ) -> CoreResult<()> {
//!     let (handle, inbox) = CoordinatorHandle::channel();
//!     let coordinator = Coordinator::new(
//!         inbox,
//!         platform,
//!         surface,
//!         Arc::new(TokioClock),
//!         CoordinatorSettings::default(),
//!     );
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     tokio::spawn(coordinator.run(shutdown_rx));
//!
//!     let response = handle.send(Command::GetState).await?;
//!     println!("{:?}", response);
//!     Ok(())
//! }
//! ```

mod controls;
mod coordinator;
mod error;
mod protocol;
mod session;
mod surface;

pub use {
    controls::{
        Affordance, ControlView, PageContext, PageOverlay, PopupPanel, PopupScreen, StateMirror,
        UserAction, format_elapsed, run_mirror,
    },
    coordinator::{
        Coordinator, CoordinatorEvent, CoordinatorHandle, CoordinatorInbox, CoordinatorSettings,
        SurfaceLink, SurfaceReporter, TabPlatform,
    },
    error::{RecorderError, Result as CoreResult},
    protocol::{
        CaptureId, Command, CommandResponse, Outcome, RECORDING_EXTENSION, RECORDING_PREFIX,
        StateSnapshot, StreamId, SurfaceCommand, SurfaceEvent, UiMessage, recording_filename,
    },
    session::{ActiveSession, CaptureMode, Clock, SessionState, TabId, TokioClock},
    surface::{
        CaptureStream, CaptureSurface, ChunkBuffer, FsRecordingSink, LocalSurfaceLink,
        MediaSource, OpenOptions, RecordingSink, StreamControl,
    },
};

#[cfg(test)]
mod tests;
