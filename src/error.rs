use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("dedup store error: {0}")]
    Store(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Outermost conversion boundary. Business and internal failures are
/// reported at the payload level with HTTP 200 - callers of this endpoint
/// inspect the body, not the status code. Only method-not-allowed maps to
/// a non-200 status.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::new_v4();

        let (status, message) = match self {
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
            }
            ApiError::MalformedBody(ref msg) => {
                tracing::warn!(request_id = %request_id, "Malformed request body: {}", msg);
                (
                    StatusCode::OK,
                    format!("internal server error: malformed request body: {}", msg),
                )
            }
            ApiError::Store(ref msg) => {
                tracing::error!(request_id = %request_id, "Dedup store error: {}", msg);
                (
                    StatusCode::OK,
                    format!("internal server error: dedup store error: {}", msg),
                )
            }
            ApiError::Internal(ref e) => {
                tracing::error!(request_id = %request_id, "Internal error: {:?}", e);
                (StatusCode::OK, format!("internal server error: {}", e))
            }
        };

        let body = json!({
            "success": false,
            "message": message,
            "request_id": request_id,
        });

        (status, Json(body)).into_response()
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, ApiError>;
