//! Recording session state machine and elapsed-time accounting.

use crate::{CaptureId, StateSnapshot};

use std::{
    fmt,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

/// Browser tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capture-duration policy chosen at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Record for a fixed duration.
    Timed,
    /// Record until stopped, with the duration as a safety cap.
    #[default]
    Always,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Timed => write!(f, "timed"),
            CaptureMode::Always => write!(f, "always"),
        }
    }
}

/// Fields that exist only while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    /// Tab being captured.
    pub target_tab: TabId,
    /// Duration policy selected at start.
    pub mode: CaptureMode,
    /// Capture duration bound in seconds, if any.
    pub duration: Option<u32>,
    /// When recording started.
    pub started_at: Instant,
    /// Sum of all completed paused intervals.
    pub total_paused: Duration,
    /// Capture opened for this session; unset until the surface confirms
    /// the start.
    pub capture: Option<CaptureId>,
}

/// Authoritative recording state, owned by the coordinator.
///
/// Paused data lives inside the `Paused` variant, so a paused-but-idle
/// session cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No recording in progress.
    #[default]
    Idle,
    /// Capturing.
    Recording {
        /// Active session fields.
        session: ActiveSession,
    },
    /// Capture paused; elapsed time is frozen.
    Paused {
        /// Active session fields.
        session: ActiveSession,
        /// When the current paused interval began.
        paused_at: Instant,
    },
}

impl SessionState {
    /// Enter `Recording` from `Idle`. Returns `false` if a session is active.
    pub fn begin(
        &mut self,
        target_tab: TabId,
        mode: CaptureMode,
        duration: Option<u32>,
        now: Instant,
    ) -> bool {
        if self.is_recording() {
            return false;
        }

        *self = SessionState::Recording {
            session: ActiveSession {
                target_tab,
                mode,
                duration,
                started_at: now,
                total_paused: Duration::ZERO,
                capture: None,
            },
        };
        true
    }

    /// Record which capture belongs to the active session. Returns `false`
    /// (no-op) when idle.
    pub fn bind_capture(&mut self, capture: CaptureId) -> bool {
        match self {
            SessionState::Idle => false,
            SessionState::Recording { session } | SessionState::Paused { session, .. } => {
                session.capture = Some(capture);
                true
            }
        }
    }

    /// Enter `Paused` from `Recording`. Returns `false` (no-op) otherwise.
    pub fn pause(&mut self, now: Instant) -> bool {
        match *self {
            SessionState::Recording { session } => {
                *self = SessionState::Paused {
                    session,
                    paused_at: now,
                };
                true
            }
            _ => false,
        }
    }

    /// Leave `Paused`, folding the paused interval into `total_paused`.
    /// Returns `false` (no-op) when not paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        match *self {
            SessionState::Paused {
                mut session,
                paused_at,
            } => {
                session.total_paused += now.saturating_duration_since(paused_at);
                *self = SessionState::Recording { session };
                true
            }
            _ => false,
        }
    }

    /// Reset to `Idle`, returning the tab that was being captured.
    pub fn finish(&mut self) -> Option<TabId> {
        let tab = self.target_tab();
        *self = SessionState::Idle;
        tab
    }

    /// Recorded time excluding pauses. Frozen while paused, zero when idle.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self {
            SessionState::Idle => Duration::ZERO,
            SessionState::Recording { session } => now
                .saturating_duration_since(session.started_at)
                .saturating_sub(session.total_paused),
            SessionState::Paused { session, paused_at } => paused_at
                .saturating_duration_since(session.started_at)
                .saturating_sub(session.total_paused),
        }
    }

    /// Read-only projection pushed to the control surfaces.
    pub fn snapshot(&self, now: Instant) -> StateSnapshot {
        StateSnapshot {
            is_recording: self.is_recording(),
            is_paused: self.is_paused(),
            elapsed_time: u64::try_from(self.elapsed(now).as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Active session fields, if any.
    pub fn session(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Idle => None,
            SessionState::Recording { session } | SessionState::Paused { session, .. } => {
                Some(session)
            }
        }
    }

    /// Capture bound to the active session, if any.
    pub fn capture(&self) -> Option<CaptureId> {
        self.session().and_then(|s| s.capture)
    }

    /// Tab being captured, if any.
    pub fn target_tab(&self) -> Option<TabId> {
        self.session().map(|s| s.target_tab)
    }

    /// True while recording or paused.
    pub fn is_recording(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }

    /// True only while paused.
    pub fn is_paused(&self) -> bool {
        matches!(self, SessionState::Paused { .. })
    }
}
