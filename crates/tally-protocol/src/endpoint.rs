/// HTTP endpoint paths for the Tally quota service.
pub mod endpoints {
    pub const COMMISSIONS: &str = "/commissions";
    pub const COMMISSIONS_ACTION: &str = "/commissions/action";
    pub const SERVICE_QUOTAS: &str = "/service_quotas";
    pub const HEALTH: &str = "/health";
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub protocol_version: u32,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            protocol_version: super::message::PROTOCOL_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_defaults() {
        let h = HealthResponse::default();
        assert_eq!(h.status, "ok");
        assert_eq!(h.protocol_version, 1);
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::COMMISSIONS, "/commissions");
        assert_eq!(endpoints::COMMISSIONS_ACTION, "/commissions/action");
        assert_eq!(endpoints::SERVICE_QUOTAS, "/service_quotas");
    }
}
