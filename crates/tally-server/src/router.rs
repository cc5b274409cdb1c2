use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use tally_protocol::endpoints;

use crate::auth::require_service_token;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all commission and quota endpoints.
///
/// Everything except `/health` sits behind the service-token check.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            endpoints::COMMISSIONS,
            post(handler::create_commission).get(handler::list_commissions),
        )
        .route(
            endpoints::COMMISSIONS_ACTION,
            post(handler::resolve_commissions),
        )
        .route("/commissions/:serial", get(handler::get_commission))
        .route(
            "/commissions/:serial/action",
            post(handler::resolve_commission),
        )
        .route(endpoints::SERVICE_QUOTAS, get(handler::service_quotas))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_service_token,
        ))
        .with_state(state);

    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}
