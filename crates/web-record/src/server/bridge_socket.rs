use crate::{
    BridgeInbound,
    server::{ServerState, send_json},
};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, instrument, warn};

pub(crate) async fn upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| run(socket, state))
}

#[instrument(skip_all)]
async fn run(mut socket: WebSocket, state: ServerState) {
    let ServerState {
        bridge,
        mut shutdown_rx,
        ..
    } = state;

    let mut requests = match bridge.attach().await {
        Ok(requests) => requests,
        Err(e) => {
            warn!(error = %e, "Refusing extension connection");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,

            request = requests.recv() => {
                let Some(request) = request else {
                    break;
                };
                if send_json(&mut sender, &request).await.is_err() {
                    break;
                }
            }

            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<BridgeInbound>(text.as_str()) {
                        Ok(message) => bridge.handle_inbound(message).await,
                        Err(e) => warn!(error = %e, "Malformed message from extension"),
                    }
                }
                Some(Ok(Message::Binary(chunk))) => bridge.handle_chunk(chunk.to_vec()).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "Extension socket read failed");
                    break;
                }
            },
        }
    }

    let _ = sender.close().await;
    bridge.detach(requests).await;
}
