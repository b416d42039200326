//! Loopback HTTP server: the UI and extension WebSocket endpoints.

mod bridge_socket;
mod ui_socket;

#[cfg(test)]
pub(crate) use ui_socket::{UiReply, respond};

use crate::{AppError, AppResult, BrowserBridge};

use web_record_core::CoordinatorHandle;

use std::panic::Location;

use axum::{
    Router,
    extract::ws::{Message, WebSocket},
    routing::get,
};
use error_location::ErrorLocation;
use futures_util::{SinkExt, stream::SplitSink};
use serde::Serialize;
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, instrument, warn};

/// Shared by every connection.
#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) handle: CoordinatorHandle,
    pub(crate) bridge: BrowserBridge,
    pub(crate) shutdown_rx: watch::Receiver<bool>,
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ui", get(ui_socket::upgrade))
        .route("/bridge", get(bridge_socket::upgrade))
        .with_state(state)
}

pub(crate) async fn health() -> &'static str {
    "ok"
}

/// Serve until the shutdown signal fires. Open sockets watch the same
/// signal and close themselves so the graceful shutdown can complete.
#[instrument(skip_all)]
pub(crate) async fn serve(listener: TcpListener, state: ServerState) -> AppResult<()> {
    let mut shutdown_rx = state.shutdown_rx.clone();

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("Server shutting down");
        })
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("Server error: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Write `value` as a JSON text frame.
pub(crate) async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to encode outgoing frame, skipped");
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
