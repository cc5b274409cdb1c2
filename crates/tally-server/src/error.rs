use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use tally_ledger::LedgerError;
use tally_protocol::ProtocolError;
use tally_types::CommissionEntry;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("quota exceeded on {} provision(s)", .0.len())]
    QuotaExceeded(Vec<CommissionEntry>),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("missing or invalid service token")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ProtocolError> for ServerError {
    fn from(e: ProtocolError) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Rejected(entries) => Self::QuotaExceeded(entries),
            LedgerError::UnknownEntity(_) | LedgerError::UnknownHolder(_) => {
                Self::NotFound(e.to_string())
            }
            LedgerError::EntityExists(_) | LedgerError::SerialInUse(_) => {
                Self::Conflict(e.to_string())
            }
            LedgerError::InvalidLimits { .. } => Self::Malformed(e.to_string()),
            LedgerError::LockPoisoned => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::QuotaExceeded(entries) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({"overLimit": {"message": self.to_string(), "provisions": entries}}),
            ),
            Self::Malformed(e) => (
                StatusCode::BAD_REQUEST,
                json!({"badRequest": {"message": e.to_string()}}),
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({"itemNotFound": {"message": message}}),
            ),
            Self::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({"conflict": {"message": message}}),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({"unauthorized": {"message": self.to_string()}}),
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"internalServerError": {"message": message}}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::Holder;

    #[test]
    fn ledger_rejection_maps_to_quota_exceeded() {
        let entries = vec![CommissionEntry::new(
            Holder::with_default_key("a", "disk"),
            30000,
        )];
        let error: ServerError = LedgerError::Rejected(entries).into();
        assert!(matches!(error, ServerError::QuotaExceeded(_)));
    }

    #[test]
    fn unknown_holder_maps_to_not_found() {
        let error: ServerError = LedgerError::UnknownHolder("a/disk/1".into()).into();
        assert!(matches!(error, ServerError::NotFound(_)));
    }

    #[test]
    fn serial_reuse_maps_to_conflict() {
        let error: ServerError = LedgerError::SerialInUse(7).into();
        assert!(matches!(error, ServerError::Conflict(_)));
    }
}
