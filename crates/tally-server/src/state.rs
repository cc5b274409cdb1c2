use std::sync::Arc;

use tally_ledger::{InMemoryQuotaLedger, SerialAllocator};
use tally_protocol::ServiceToken;

use crate::config::ServerConfig;

/// Shared handles behind every request handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<InMemoryQuotaLedger>,
    pub serials: Arc<SerialAllocator>,
    pub token: ServiceToken,
    pub default_key: String,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_ledger(
            config,
            Arc::new(InMemoryQuotaLedger::new()),
            Arc::new(SerialAllocator::new()),
        )
    }

    /// Wire an existing ledger and allocator, e.g. one shared with an
    /// in-process coordinator or a test fixture.
    pub fn with_ledger(
        config: &ServerConfig,
        ledger: Arc<InMemoryQuotaLedger>,
        serials: Arc<SerialAllocator>,
    ) -> Self {
        Self {
            ledger,
            serials,
            token: ServiceToken::new(config.service_token.clone()),
            default_key: config.default_key.clone(),
        }
    }
}
