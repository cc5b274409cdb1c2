//! HTTP server for the Tally quota ledger.
//!
//! Exposes the commission lifecycle (open, inspect, accept/reject) and
//! per-user quota usage over REST, authenticated by a static service token.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::TallyServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use tally_ledger::QuotaWriter;
    use tally_types::Holder;

    const TOKEN: &str = "test-token";

    fn test_server() -> TallyServer {
        let config = ServerConfig {
            service_token: TOKEN.into(),
            ..Default::default()
        };
        let server = TallyServer::new(config);
        server.ledger().create_entity("user12", "system", "1").unwrap();
        server
            .ledger()
            .set_quota(
                &Holder::with_default_key("user12", "resource12"),
                100,
                100,
                100,
            )
            .unwrap();
        server
    }

    async fn call(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Auth-Token", TOKEN)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn provision(quantity: i64) -> Value {
        json!({
            "provisions": [{
                "holder": "user12",
                "source": "system",
                "resource": "resource12",
                "quantity": quantity
            }]
        })
    }

    #[tokio::test]
    async fn health_is_open() {
        let server = test_server();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_requires_service_token() {
        let server = test_server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/commissions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let wrong = Request::builder()
            .uri("/commissions")
            .header("X-Auth-Token", "wrong")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(wrong).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn over_limit_commission_is_413() {
        let server = test_server();
        let (status, body) =
            call(server.router(), "POST", "/commissions", Some(provision(30000))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["overLimit"]["provisions"].is_array());
    }

    #[tokio::test]
    async fn sequential_commissions_get_sequential_serials() {
        let server = test_server();
        for expected in 1..=3u64 {
            let (status, body) =
                call(server.router(), "POST", "/commissions", Some(provision(10))).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["serial"], json!(expected));
        }

        let (status, body) = call(server.router(), "GET", "/commissions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn batch_action_partitions_outcomes() {
        let server = test_server();
        for _ in 0..3 {
            call(server.router(), "POST", "/commissions", Some(provision(10))).await;
        }

        let (status, body) = call(
            server.router(),
            "POST",
            "/commissions/action",
            Some(json!({"accept": [1, 3], "reject": [2, 3, 4]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], json!([1]));
        assert_eq!(body["rejected"], json!([2]));
        assert_eq!(body["failed"], json!([3, 4]));
    }

    #[tokio::test]
    async fn detail_is_404_once_resolved() {
        let server = test_server();
        call(server.router(), "POST", "/commissions", Some(provision(10))).await;

        let (status, body) = call(server.router(), "GET", "/commissions/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serial"], json!(1));

        call(
            server.router(),
            "POST",
            "/commissions/action",
            Some(json!({"accept": [1]})),
        )
        .await;

        let (status, _) = call(server.router(), "GET", "/commissions/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(server.router(), "GET", "/commissions/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn single_action_then_repeat_is_404() {
        let server = test_server();
        call(server.router(), "POST", "/commissions", Some(provision(10))).await;

        let (status, _) = call(
            server.router(),
            "POST",
            "/commissions/1/action",
            Some(json!({"accept": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            server.router(),
            "POST",
            "/commissions/1/action",
            Some(json!({"accept": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn single_reject_releases_the_reservation() {
        let server = test_server();
        call(server.router(), "POST", "/commissions", Some(provision(10))).await;

        let (status, _) = call(
            server.router(),
            "POST",
            "/commissions/1/action",
            Some(json!({"reject": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(
            server.router(),
            "GET",
            "/service_quotas?user=user12",
            None,
        )
        .await;
        assert_eq!(body["user12"]["resource12"]["usage"], json!(0));
        assert_eq!(body["user12"]["resource12"]["pending"], json!(0));
    }

    #[tokio::test]
    async fn malformed_bodies_are_400() {
        let server = test_server();

        // Not JSON at all.
        let request = Request::builder()
            .method("POST")
            .uri("/commissions")
            .header("X-Auth-Token", TOKEN)
            .body(Body::from("not json"))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // provisions is not a list.
        let (status, _) = call(
            server.router(),
            "POST",
            "/commissions",
            Some(json!({"provisions": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Provision with a missing field.
        let (status, _) = call(
            server.router(),
            "POST",
            "/commissions",
            Some(json!({"provisions": [{"holder": "user12", "quantity": 1}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn service_quotas_reports_usage_and_pending() {
        let server = test_server();
        call(server.router(), "POST", "/commissions", Some(provision(30))).await;
        call(server.router(), "POST", "/commissions", Some(provision(15))).await;
        call(
            server.router(),
            "POST",
            "/commissions/action",
            Some(json!({"accept": [1]})),
        )
        .await;

        let (status, body) = call(
            server.router(),
            "GET",
            "/service_quotas?user=user12",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user12"]["resource12"]["usage"], json!(30));
        assert_eq!(body["user12"]["resource12"]["pending"], json!(15));

        // Without a user filter, all entities are listed.
        let (_, body) = call(server.router(), "GET", "/service_quotas", None).await;
        assert!(body["user12"].is_object());
    }

    #[tokio::test]
    async fn unknown_holder_commission_is_404() {
        let server = test_server();
        let body = json!({
            "provisions": [{
                "holder": "ghost",
                "source": "system",
                "resource": "resource12",
                "quantity": 1
            }]
        });
        let (status, _) = call(server.router(), "POST", "/commissions", Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
