//! Web-Record: records a browser tab's audio and video to a local file.
//!
//! The browser extension connects to `/bridge` and performs browser API
//! calls for the host; popup and overlay clients connect to `/ui`.

mod app;
mod bridge;
mod config;
mod console;
mod error;
mod logging;
mod server;

pub(crate) use {
    app::App,
    bridge::{BridgeInbound, BrowserBridge},
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use tracing::error;

/// Application entry point.
#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // Held for the process lifetime; dropping it stops file logging.
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = App::new(config).run().await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
