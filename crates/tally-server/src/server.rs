use std::sync::Arc;

use tokio::net::TcpListener;

use tally_ledger::{InMemoryQuotaLedger, SerialAllocator};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Tally quota HTTP server.
pub struct TallyServer {
    config: ServerConfig,
    state: AppState,
}

impl TallyServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(&config);
        Self { config, state }
    }

    /// Serve an existing ledger, e.g. one shared with in-process services.
    pub fn with_ledger(
        config: ServerConfig,
        ledger: Arc<InMemoryQuotaLedger>,
        serials: Arc<SerialAllocator>,
    ) -> Self {
        let state = AppState::with_ledger(&config, ledger, serials);
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<InMemoryQuotaLedger> {
        &self.state.ledger
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!("tally server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
