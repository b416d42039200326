use crate::{CaptureMode, ControlView, StateMirror, StateSnapshot, UserAction};

const SECONDS_PER_MINUTE: u32 = 60;

/// Which popup view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupScreen {
    /// Mode and duration inputs with the start button.
    Setup,
    /// Timer, status badge and pause/resume/stop.
    Recording,
}

/// Popup panel: setup form plus a mirror of the session.
#[derive(Debug, Clone)]
pub struct PopupPanel {
    mode: CaptureMode,
    timed_minutes: Option<u32>,
    max_minutes: Option<u32>,
    snapshot: StateSnapshot,
}

impl PopupPanel {
    /// Panel with the form prefilled.
    pub fn new(mode: CaptureMode, timed_minutes: Option<u32>, max_minutes: Option<u32>) -> Self {
        Self {
            mode,
            timed_minutes,
            max_minutes,
            snapshot: StateSnapshot::IDLE,
        }
    }

    /// Select a capture mode.
    pub fn select_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    /// Currently selected capture mode.
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Minutes entered for timed mode.
    pub fn set_timed_minutes(&mut self, minutes: Option<u32>) {
        self.timed_minutes = minutes;
    }

    /// Minutes entered as the always-mode safety cap.
    pub fn set_max_minutes(&mut self, minutes: Option<u32>) {
        self.max_minutes = minutes;
    }

    /// Start action from the form. The input matching the mode is used,
    /// converted to seconds.
    pub fn start_action(&self) -> UserAction {
        let minutes = match self.mode {
            CaptureMode::Timed => self.timed_minutes,
            CaptureMode::Always => self.max_minutes,
        };

        UserAction::Start {
            mode: self.mode,
            duration: minutes.map(|m| m.saturating_mul(SECONDS_PER_MINUTE)),
        }
    }

    /// Active view.
    pub fn screen(&self) -> PopupScreen {
        if self.snapshot.is_recording {
            PopupScreen::Recording
        } else {
            PopupScreen::Setup
        }
    }

    /// Status badge text, shown on the recording screen.
    pub fn status_badge(&self) -> Option<&'static str> {
        match (self.snapshot.is_recording, self.snapshot.is_paused) {
            (false, _) => None,
            (true, false) => Some("Recording"),
            (true, true) => Some("Paused"),
        }
    }
}

impl StateMirror for PopupPanel {
    fn apply(&mut self, snapshot: StateSnapshot) {
        self.snapshot = snapshot;
    }

    fn view(&self) -> ControlView {
        ControlView::from_snapshot(&self.snapshot)
    }
}
