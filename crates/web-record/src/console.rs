use web_record_core::{
    ControlView, CoordinatorHandle, CoreResult, PopupPanel, StateMirror, run_mirror,
};

use tokio::sync::watch;
use tracing::{debug, info};

/// Mirror the session into the log the way the popup would render it.
/// Status changes are logged at info, timer ticks at debug.
pub(crate) async fn run_console(
    panel: PopupPanel,
    handle: CoordinatorHandle,
    shutdown_rx: watch::Receiver<bool>,
) -> CoreResult<PopupPanel> {
    let mut last_badge = None;

    run_mirror(panel, handle, shutdown_rx, move |panel: &PopupPanel| {
        let badge = panel.status_badge();
        let changed = last_badge != Some(badge);
        last_badge = Some(badge);

        match panel.view() {
            ControlView::Hidden if changed => {
                info!(mode = %panel.mode(), "Ready to record");
            }
            ControlView::Visible { timer, .. } if changed => {
                info!(
                    status = badge.unwrap_or_default(),
                    timer = %timer,
                    "Recording state changed"
                );
            }
            ControlView::Visible { timer, .. } => debug!(timer = %timer, "Recording"),
            ControlView::Hidden => {}
        }
    })
    .await
}
