use crate::{ControlView, StateMirror, StateSnapshot};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::debug;

/// Process-wide marker of one page, shared by every injection attempt.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    controls_initialized: Arc<AtomicBool>,
}

impl PageContext {
    /// Fresh page with no overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an overlay owns this page.
    pub fn has_overlay(&self) -> bool {
        self.controls_initialized.load(Ordering::Acquire)
    }
}

/// In-page floating controls.
///
/// Shown while a session is active; removes itself and clears the page
/// marker once told the session is idle.
#[derive(Debug)]
pub struct PageOverlay {
    page: PageContext,
    attached: bool,
    view: ControlView,
}

impl PageOverlay {
    /// Inject into `page`. Returns `None` if the page already has one.
    pub fn inject(page: &PageContext) -> Option<Self> {
        if page.controls_initialized.swap(true, Ordering::AcqRel) {
            debug!("Overlay already initialized in this page");
            return None;
        }

        Some(Self {
            page: page.clone(),
            attached: true,
            view: ControlView::Hidden,
        })
    }

    /// True while the overlay is part of the page.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl StateMirror for PageOverlay {
    fn apply(&mut self, snapshot: StateSnapshot) {
        if snapshot.is_recording {
            self.attached = true;
        } else if self.attached {
            self.attached = false;
            self.page.controls_initialized.store(false, Ordering::Release);
            debug!("Overlay removed from page");
        }
        self.view = ControlView::from_snapshot(&snapshot);
    }

    fn view(&self) -> ControlView {
        self.view.clone()
    }
}
