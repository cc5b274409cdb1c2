use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use tally_protocol::AUTH_TOKEN_HEADER;

use crate::error::ServerError;
use crate::state::AppState;

/// Reject any request whose `X-Auth-Token` header does not match the
/// configured service token.
pub async fn require_service_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(token) if state.token.matches(token) => next.run(request).await,
        _ => ServerError::Unauthorized.into_response(),
    }
}
