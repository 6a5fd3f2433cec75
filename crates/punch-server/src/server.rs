use std::sync::Arc;

use punch_relay::SubscriberRegistry;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Punch clock relay server.
pub struct PunchServer {
    config: ServerConfig,
}

impl PunchServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router over fresh state (useful for testing).
    pub async fn router(&self) -> ServerResult<axum::Router> {
        let state = AppState::from_config(self.config.clone()).await?;
        Ok(build_router(state))
    }

    /// Start serving requests until Ctrl-C or SIGTERM.
    pub async fn serve(self) -> ServerResult<()> {
        let state = AppState::from_config(self.config.clone()).await?;
        let registry = Arc::clone(&state.registry);
        let app = build_router(state);

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("punch server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(registry))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        info!("punch server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C or SIGTERM, then releases every kiosk stream so the
/// graceful shutdown is not held open by idle connections.
async fn shutdown_signal(registry: Arc<SubscriberRegistry>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl-C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    registry.clear();
}
