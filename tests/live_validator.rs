//! Live (Pico) validator behavior against a mocked verification service.

use picogate::{
    config::{CacheConfig, Config, PicoConfig, ServerConfig},
    models::purchase::PurchaseRequest,
    routes::create_router,
    services::{PicoValidator, PlaceholderSigner, PurchaseValidator},
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn pico_config(verify_url: String, request_timeout_ms: u64) -> PicoConfig {
    PicoConfig {
        app_id: "test-app".to_string(),
        app_secret: "test-secret".to_string(),
        verify_url,
        request_timeout_ms,
    }
}

fn validator_against(server: &MockServer, timeout_ms: u64) -> PicoValidator {
    PicoValidator::new(
        &pico_config(format!("{}/verify", server.uri()), timeout_ms),
        Arc::new(PlaceholderSigner::new()),
    )
}

fn pico_request() -> PurchaseRequest {
    PurchaseRequest {
        product_id: "p1".to_string(),
        purchase_token: "live_token_1".to_string(),
        user_id: "u1".to_string(),
        platform: "pico".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn ret_zero_approves_the_purchase() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret": 0, "msg": "ok"})))
        .mount(&server)
        .await;

    let result = validator_against(&server, 1000)
        .validate(&pico_request())
        .await;

    assert!(result.success);
    assert!(!result.is_duplicate);
    assert_eq!(result.message, "purchase verified");
    assert_eq!(result.validated_product_id, "p1");
}

#[tokio::test]
async fn non_zero_ret_rejects_with_remote_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ret": 7, "msg": "expired"})),
        )
        .mount(&server)
        .await;

    let result = validator_against(&server, 1000)
        .validate(&pico_request())
        .await;

    assert!(!result.success);
    assert!(result.message.contains("verification failed"));
    assert!(result.message.contains("expired"));
}

#[tokio::test]
async fn missing_remote_message_falls_back_to_the_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret": 13})))
        .mount(&server)
        .await;

    let result = validator_against(&server, 1000)
        .validate(&pico_request())
        .await;

    assert!(!result.success);
    assert!(result.message.contains("code 13"));
}

#[tokio::test]
async fn slow_remote_reports_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ret": 0}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let result = validator_against(&server, 100)
        .validate(&pico_request())
        .await;

    assert!(!result.success);
    assert_eq!(result.message, "verification request timed out");
}

#[tokio::test]
async fn remote_http_error_names_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = validator_against(&server, 1000)
        .validate(&pico_request())
        .await;

    assert!(!result.success);
    assert!(result.message.contains("verification server error: 500"));
}

#[tokio::test]
async fn unparseable_remote_reply_reads_as_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = validator_against(&server, 1000)
        .validate(&pico_request())
        .await;

    assert!(!result.success);
    assert_eq!(result.message, "verification service temporarily unavailable");
}

#[tokio::test]
async fn outbound_payload_carries_credentials_and_signature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret": 0})))
        .mount(&server)
        .await;

    validator_against(&server, 1000)
        .validate(&pico_request())
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(payload["app_id"], json!("test-app"));
    assert_eq!(payload["user_id"], json!("u1"));
    assert_eq!(payload["product_id"], json!("p1"));
    assert_eq!(payload["purchase_token"], json!("live_token_1"));
    // Placeholder digest: 64 hex chars
    assert_eq!(payload["sign"].as_str().unwrap().len(), 64);
}

/// Full flow through the router with platform "pico": verified once, then
/// deduplicated.
#[tokio::test]
async fn pico_platform_end_to_end_with_dedup() {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ret": 0, "msg": "ok"})))
        .mount(&server)
        .await;

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        pico: pico_config(format!("{}/verify", server.uri()), 1000),
        cache: CacheConfig { ttl_hours: 24 },
    };
    let app = create_router(AppState::new(config));

    let body = json!({
        "product_id": "p1",
        "purchase_token": "live_token_1",
        "user_id": "u1",
        "platform": "pico",
    })
    .to_string();

    let mut replies = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/purchase/validate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        replies.push(serde_json::from_slice::<Value>(&bytes).unwrap());
    }

    assert_eq!(replies[0]["success"], json!(true));
    assert_eq!(replies[0]["is_duplicate"], json!(false));
    assert_eq!(replies[1]["success"], json!(true));
    assert_eq!(replies[1]["is_duplicate"], json!(true));

    // The remote endpoint was only consulted once; the second call was
    // answered from the dedup store.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
