use crate::{AppError, AppResult, BrowserBridge, config::Config, console::run_console, server};

use web_record_core::{
    Coordinator, CoordinatorHandle, FsRecordingSink, LocalSurfaceLink, MediaSource,
    RecordingSink, SurfaceLink, TabPlatform, TokioClock,
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info, instrument, warn};

/// How long to wait for background tasks after the server stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Host process: wires the coordinator, capture surface, extension bridge
/// and server together.
pub struct App {
    pub(crate) config: Config,
}

impl App {
    pub(crate) fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until Ctrl+C.
    #[instrument(skip(self))]
    pub(crate) async fn run(self) -> AppResult<()> {
        info!("Web-Record starting");

        let output_dir = self.config.output_dir()?;

        // Mailboxes first: the bridge and the surface report into them.
        let (handle, inbox) = CoordinatorHandle::channel();
        let bridge = BrowserBridge::new(handle.clone(), self.config.bridge.request_timeout());

        let surface: Arc<dyn SurfaceLink> = Arc::new(LocalSurfaceLink::new(
            Arc::new(bridge.clone()) as Arc<dyn MediaSource>,
            Arc::new(FsRecordingSink::new(&output_dir)) as Arc<dyn RecordingSink>,
            self.config.open_options(),
            handle.reporter(),
        ));

        let coordinator = Coordinator::new(
            inbox,
            Arc::new(bridge.clone()) as Arc<dyn TabPlatform>,
            surface,
            Arc::new(TokioClock),
            self.config.coordinator_settings(),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let coordinator_task = tokio::spawn(coordinator.run(shutdown_rx.clone()));
        let console_task = tokio::spawn(run_console(
            self.config.popup_panel(),
            handle.clone(),
            shutdown_rx.clone(),
        ));

        let addr = self.config.server.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::ServerError {
                reason: format!("Failed to bind {}: {}", addr, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            url = %self.config.server_url(),
            output_dir = ?output_dir,
            "Web-Record listening"
        );

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Ctrl+C received"),
                Err(e) => {
                    // Without a signal handler, only the process exit stops us.
                    error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
            let _ = shutdown_tx.send(true);
        });

        server::serve(
            listener,
            server::ServerState {
                handle,
                bridge,
                shutdown_rx,
            },
        )
        .await?;

        match tokio::time::timeout(SHUTDOWN_GRACE, coordinator_task).await {
            Ok(Ok(Ok(()))) => info!("Coordinator stopped cleanly"),
            Ok(Ok(Err(e))) => error!(error = ?e, "Coordinator error"),
            Ok(Err(e)) => error!(error = ?e, "Coordinator task panicked"),
            Err(_) => warn!("Coordinator did not stop within timeout"),
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, console_task).await {
            Ok(Ok(Ok(_))) => {}
            Ok(Ok(Err(e))) => warn!(error = ?e, "Console mirror error"),
            Ok(Err(e)) => warn!(error = ?e, "Console mirror task panicked"),
            Err(_) => warn!("Console mirror did not stop within timeout"),
        }

        info!("Web-Record shut down successfully");

        Ok(())
    }
}
