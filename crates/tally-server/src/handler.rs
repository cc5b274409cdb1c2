use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use tally_ledger::{QuotaReader, QuotaWriter};
use tally_protocol::{
    CommissionRequest, HealthResponse, ProtocolError, ResolveRequest, SerialResponse,
    ServiceQuotasResponse, SingleAction,
};
use tally_types::{Commission, CommissionEntry, CommissionOptions, Holder, Resolution};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// `POST /commissions` — open a provisional commission.
///
/// The body is parsed by hand so every malformed shape maps to `400` rather
/// than an extractor-specific status.
pub async fn create_commission(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ProtocolError::InvalidJson)?;
    let request = CommissionRequest::from_value(&value)?;

    // Negative quantities claw back a previous allocation.
    let mut sub = Vec::new();
    let mut add = Vec::new();
    for provision in &request.provisions {
        let holder = Holder::new(&provision.holder, &provision.resource, &state.default_key);
        if provision.quantity < 0 {
            let released = provision
                .quantity
                .checked_neg()
                .ok_or_else(|| ServerError::Malformed("quantity out of range".into()))?;
            sub.push(CommissionEntry::new(holder, released));
        } else {
            add.push(CommissionEntry::new(holder, provision.quantity));
        }
    }

    let opts = CommissionOptions {
        force: request.force,
        auto_accept: request.auto_accept,
        name: request.name.clone(),
    };
    let serial = state.serials.next();
    state.ledger.apply(serial, &sub, &add, &opts)?;

    debug!(serial, provisions = request.provisions.len(), "commission created");
    Ok((StatusCode::CREATED, Json(SerialResponse { serial })))
}

/// `GET /commissions` — all pending serials.
pub async fn list_commissions(State(state): State<AppState>) -> ServerResult<Json<Vec<u64>>> {
    Ok(Json(state.ledger.pending_serials()?))
}

/// `GET /commissions/<serial>` — pending commission detail; 404 once the
/// serial is resolved or unknown.
pub async fn get_commission(
    State(state): State<AppState>,
    Path(serial): Path<u64>,
) -> ServerResult<Json<Commission>> {
    match state.ledger.pending_commission(serial)? {
        Some(commission) => Ok(Json(commission)),
        None => Err(ServerError::NotFound(format!(
            "commission {serial} is resolved or unknown"
        ))),
    }
}

/// `POST /commissions/action` — batch accept/reject.
pub async fn resolve_commissions(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<Resolution>> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ProtocolError::InvalidJson)?;
    let request: ResolveRequest = serde_json::from_value(value)
        .map_err(|_| ServerError::Malformed("accept and reject must be lists of serials".into()))?;
    Ok(Json(
        state.ledger.resolve_serials(&request.accept, &request.reject)?,
    ))
}

/// `POST /commissions/<serial>/action` — resolve one serial; 404 when it is
/// already terminal or unknown.
pub async fn resolve_commission(
    State(state): State<AppState>,
    Path(serial): Path<u64>,
    body: Bytes,
) -> ServerResult<Json<Value>> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ProtocolError::InvalidJson)?;
    let action = SingleAction::from_value(&value)?;

    if state.ledger.pending_commission(serial)?.is_none() {
        return Err(ServerError::NotFound(format!(
            "commission {serial} is resolved or unknown"
        )));
    }

    let resolution = match action {
        SingleAction::Accept => state.ledger.resolve_serials(&[serial], &[])?,
        SingleAction::Reject => state.ledger.resolve_serials(&[], &[serial])?,
    };
    if resolution.failed.contains(&serial) {
        return Err(ServerError::Conflict(format!(
            "serial {serial} could not be resolved"
        )));
    }
    Ok(Json(json!({})))
}

#[derive(Debug, Deserialize)]
pub struct ServiceQuotasParams {
    pub user: Option<String>,
}

/// `GET /service_quotas[?user=ID]` — per-user per-resource usage/pending.
pub async fn service_quotas(
    State(state): State<AppState>,
    Query(params): Query<ServiceQuotasParams>,
) -> ServerResult<Json<ServiceQuotasResponse>> {
    let mut response = ServiceQuotasResponse::new();
    match params.user {
        Some(user) => {
            let usage = state.ledger.usage_of(&user)?;
            response.insert(user, usage);
        }
        None => {
            for entity in state.ledger.entities()? {
                let usage = state.ledger.usage_of(&entity)?;
                response.insert(entity, usage);
            }
        }
    }
    Ok(Json(response))
}
