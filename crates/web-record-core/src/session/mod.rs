mod clock;
mod state;

pub use {
    clock::{Clock, TokioClock},
    state::{ActiveSession, CaptureMode, SessionState, TabId},
};
