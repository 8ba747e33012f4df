use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

/// Per-request correlation id, attached to request extensions so the
/// handler echoes the same value the logs carry.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub uuid::Uuid);

/// Body capture limit; validation requests are small, anything past this
/// is logged truncated.
const BODY_LOG_LIMIT: usize = 2000;

/// Logs every request with its body and a generated correlation id, then
/// the response status and latency under the same id.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let (mut parts, body) = request.into_parts();
    parts.extensions.insert(RequestId(request_id));

    // Buffer the body so it can be logged and handed on (1MB cap)
    let bytes = match to_bytes(body, 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(request_id = %request_id, "Failed to read request body: {}", e);
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        body = %truncate_body(&String::from_utf8_lossy(&bytes)),
        "→ Request"
    );

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "← Response"
    );

    response
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= BODY_LOG_LIMIT {
        body.to_string()
    } else {
        format!(
            "{}...[truncated, {} bytes total]",
            &body[..BODY_LOG_LIMIT],
            body.len()
        )
    }
}
