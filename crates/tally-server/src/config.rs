use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Pre-shared token expected in `X-Auth-Token` on every API call.
    pub service_token: String,
    /// Ledger key partition commissions are applied under.
    pub default_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8008".parse().unwrap(),
            service_token: "tally-dev-token".into(),
            default_key: "1".into(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
