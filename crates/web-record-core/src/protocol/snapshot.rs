use serde::{Deserialize, Serialize};

/// Derived, read-only view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// True from successful start until completion.
    pub is_recording: bool,
    /// True only while recording is paused.
    pub is_paused: bool,
    /// Recorded milliseconds, excluding pauses.
    pub elapsed_time: u64,
}

impl StateSnapshot {
    /// Projection of an idle session.
    pub const IDLE: StateSnapshot = StateSnapshot {
        is_recording: false,
        is_paused: false,
        elapsed_time: 0,
    };
}

/// Coordinator -> control surface push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiMessage {
    /// Session state changed, or the periodic tick fired.
    StateUpdate {
        /// Current projection.
        state: StateSnapshot,
    },
}
