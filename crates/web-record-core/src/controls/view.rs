use crate::{CaptureMode, Command, StateSnapshot, format_elapsed};

/// Buttons a visible control surface offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Pause a running recording.
    Pause,
    /// Resume a paused recording.
    Resume,
    /// Stop the recording.
    Stop,
}

impl Affordance {
    /// Action forwarded when this button is pressed.
    pub fn action(self) -> UserAction {
        match self {
            Affordance::Pause => UserAction::Pause,
            Affordance::Resume => UserAction::Resume,
            Affordance::Stop => UserAction::Stop,
        }
    }
}

/// Operator input, forwarded verbatim to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Start button.
    Start {
        /// Selected mode.
        mode: CaptureMode,
        /// Duration in seconds.
        duration: Option<u32>,
    },
    /// Pause button.
    Pause,
    /// Resume button.
    Resume,
    /// Stop button.
    Stop,
}

impl UserAction {
    /// Coordinator command for this action.
    pub fn into_command(self) -> Command {
        match self {
            UserAction::Start { mode, duration } => Command::StartRecording { mode, duration },
            UserAction::Pause => Command::PauseRecording,
            UserAction::Resume => Command::ResumeRecording,
            UserAction::Stop => Command::StopRecording,
        }
    }
}

/// What a control surface displays for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControlView {
    /// Idle: nothing shown.
    #[default]
    Hidden,
    /// Recording or paused.
    Visible {
        /// `HH:MM:SS`, frozen while paused.
        timer: String,
        /// Paused indicator.
        paused: bool,
        /// Buttons offered, in display order.
        affordances: Vec<Affordance>,
    },
}

impl ControlView {
    /// Render a snapshot into the fixed visual vocabulary.
    pub fn from_snapshot(snapshot: &StateSnapshot) -> Self {
        if !snapshot.is_recording {
            return ControlView::Hidden;
        }

        let toggle = if snapshot.is_paused {
            Affordance::Resume
        } else {
            Affordance::Pause
        };

        ControlView::Visible {
            timer: format_elapsed(snapshot.elapsed_time),
            paused: snapshot.is_paused,
            affordances: vec![toggle, Affordance::Stop],
        }
    }

    /// True unless hidden.
    pub fn is_visible(&self) -> bool {
        matches!(self, ControlView::Visible { .. })
    }
}
