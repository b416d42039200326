use crate::{CaptureId, SurfaceEvent, TabId};

use tokio::sync::mpsc;
use tracing::warn;

/// Out-of-band notifications delivered to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A browser tab was closed.
    TabRemoved(TabId),
    /// Report from the capture surface about one capture.
    Surface {
        /// Capture the report is about.
        capture: CaptureId,
        /// What happened to it.
        event: SurfaceEvent,
    },
}

/// Route from the capture surface back to the coordinator.
#[derive(Debug, Clone)]
pub struct SurfaceReporter {
    pub(crate) events_tx: mpsc::Sender<CoordinatorEvent>,
}

impl SurfaceReporter {
    /// Deliver a surface report. A gone coordinator is logged, not surfaced.
    pub async fn report(&self, capture: CaptureId, event: SurfaceEvent) {
        let event = CoordinatorEvent::Surface { capture, event };
        if let Err(e) = self.events_tx.send(event).await {
            warn!(event = ?e.0, "Coordinator gone, dropping surface report");
        }
    }
}
