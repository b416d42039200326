use crate::{CaptureMode, StateSnapshot};

use serde::{Deserialize, Serialize};

/// Commands accepted by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Query the current projection.
    GetState,
    /// Start recording the active tab.
    StartRecording {
        /// Duration policy.
        #[serde(default)]
        mode: CaptureMode,
        /// Duration bound in seconds. Zero or absent means unbounded.
        #[serde(default)]
        duration: Option<u32>,
    },
    /// Stop the current recording.
    StopRecording,
    /// Pause the current recording.
    PauseRecording,
    /// Resume a paused recording.
    ResumeRecording,
}

/// `{success, error?}` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the command was accepted.
    pub success: bool,
    /// Operator-facing failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandResponse {
    /// Reply to `GET_STATE`.
    State(StateSnapshot),
    /// Reply to every other command.
    Outcome(Outcome),
}

impl CommandResponse {
    /// Successful outcome.
    pub fn ok() -> Self {
        CommandResponse::Outcome(Outcome {
            success: true,
            error: None,
        })
    }

    /// Failed outcome carrying a message shown verbatim to the operator.
    pub fn failed(error: impl Into<String>) -> Self {
        CommandResponse::Outcome(Outcome {
            success: false,
            error: Some(error.into()),
        })
    }

    /// True for `State` replies and successful outcomes.
    pub fn is_success(&self) -> bool {
        match self {
            CommandResponse::State(_) => true,
            CommandResponse::Outcome(outcome) => outcome.success,
        }
    }
}
