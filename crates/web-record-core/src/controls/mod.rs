//! Control surfaces: pure mirrors of the coordinator's projection.

mod format;
mod mirror;
mod overlay;
mod popup;
mod view;

pub use {
    format::format_elapsed,
    mirror::{StateMirror, run_mirror},
    overlay::{PageContext, PageOverlay},
    popup::{PopupPanel, PopupScreen},
    view::{Affordance, ControlView, UserAction},
};
