use crate::server::{ServerState, send_json};

use web_record_core::{Command, CommandResponse, CoordinatorHandle};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};

/// Command from a popup or overlay client, with an optional id echoed in
/// the reply.
#[derive(Debug, Deserialize)]
pub(crate) struct UiRequest {
    #[serde(default)]
    pub(crate) id: Option<u64>,
    #[serde(flatten)]
    pub(crate) command: Command,
}

/// Reply to a [`UiRequest`].
#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct UiReply {
    pub(crate) id: Option<u64>,
    pub(crate) response: CommandResponse,
}

pub(crate) async fn upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| run(socket, state))
}

/// Decode one request, run it through the coordinator and build the reply.
pub(crate) async fn respond(handle: &CoordinatorHandle, text: &str) -> UiReply {
    let request: UiRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Rejected malformed UI request");
            return UiReply {
                id: None,
                response: CommandResponse::failed(format!("Invalid request: {}", e)),
            };
        }
    };

    let response = match handle.send(request.command).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Coordinator unavailable");
            CommandResponse::failed(e.operator_message())
        }
    };

    UiReply {
        id: request.id,
        response,
    }
}

#[instrument(skip_all)]
async fn run(socket: WebSocket, state: ServerState) {
    let ServerState {
        handle,
        mut shutdown_rx,
        ..
    } = state;

    // Subscribe before the first request so no push is missed.
    let mut updates = handle.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("UI client connected");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,

            frame = receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(error = %e, "UI socket read failed");
                        break;
                    }
                };
                let reply = respond(&handle, text.as_str()).await;
                if send_json(&mut sender, &reply).await.is_err() {
                    break;
                }
            }

            update = updates.recv() => match update {
                Ok(message) => {
                    if send_json(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "UI client lagged, newer snapshot follows");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    let _ = sender.close().await;
    info!("UI client disconnected");
}
