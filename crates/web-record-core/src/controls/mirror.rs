use crate::{
    Command, CommandResponse, ControlView, CoordinatorHandle, CoreResult, StateSnapshot, UiMessage,
};

use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, instrument};

/// A control surface that renders the coordinator's projection and derives
/// nothing beyond formatting.
pub trait StateMirror {
    /// Adopt a new projection.
    fn apply(&mut self, snapshot: StateSnapshot);

    /// Current rendering.
    fn view(&self) -> ControlView;
}

/// Drive `mirror` for its lifetime: one `GET_STATE` on activation, then
/// every `STATE_UPDATE` until shutdown. `render` runs after each change.
#[instrument(skip_all)]
pub async fn run_mirror<M, F>(
    mut mirror: M,
    handle: CoordinatorHandle,
    mut shutdown_rx: watch::Receiver<bool>,
    mut render: F,
) -> CoreResult<M>
where
    M: StateMirror + Send,
    F: FnMut(&M) + Send,
{
    // Subscribe first so nothing between the query and the loop is missed.
    let mut updates = handle.subscribe();

    if let CommandResponse::State(snapshot) = handle.send(Command::GetState).await? {
        mirror.apply(snapshot);
        render(&mirror);
    }

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("Mirror shutting down");
                break;
            }

            update = updates.recv() => match update {
                Ok(UiMessage::StateUpdate { state }) => {
                    mirror.apply(state);
                    render(&mirror);
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Mirror lagged, newer snapshot follows");
                }
                Err(RecvError::Closed) => {
                    info!("Coordinator gone, mirror stopping");
                    break;
                }
            },
        }
    }

    Ok(mirror)
}
