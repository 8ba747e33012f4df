use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    middleware::RequestId,
    models::{
        common::Platform,
        purchase::{PurchaseRequest, ValidateResponse, ValidationResult},
    },
    services::CacheEntry,
};

/// POST /api/v1/purchase/validate
///
/// Failure boundary for the whole validation flow: body parsing, parameter
/// checks and validator dispatch run in `process`, and any fault it
/// surfaces is converted to a payload-level failure here. The endpoint
/// answers 200 for everything except a disallowed method; callers inspect
/// the body.
#[instrument(skip(state, request_id, body))]
pub async fn validate_purchase(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> Json<ValidateResponse> {
    let request_id = request_id.map_or_else(Uuid::new_v4, |Extension(id)| id.0);
    let start = Instant::now();

    let result = match process(&state, &body).await {
        Ok(result) => result,
        Err(e) => {
            error!(request_id = %request_id, "Validation fault: {}", e);
            ValidationResult::internal_error(e)
        }
    };

    Json(ValidateResponse {
        result,
        request_id,
        processing_time: start.elapsed().as_millis() as u64,
    })
}

async fn process(state: &AppState, body: &Bytes) -> Result<ValidationResult> {
    let request: PurchaseRequest = if body.is_empty() {
        PurchaseRequest::default()
    } else {
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?
    };

    if request.validate().is_err() {
        return Ok(ValidationResult::missing_params(&request.product_id));
    }

    let key = request.dedup_key();
    if state.dedup.has(&key).await? {
        info!(
            "Duplicate validation attempt for user {} product {}",
            request.user_id, request.product_id
        );
        return Ok(ValidationResult::duplicate(&request.product_id));
    }

    let platform = Platform::from_str(&request.platform);
    let outcome = state.validator_for(platform).validate(&request).await;

    if outcome.success {
        let entry = CacheEntry::new(&request.product_id, &request.user_id);
        if !state.dedup.check_and_insert(&key, entry).await? {
            // A concurrent request for the same (user, token) won the insert.
            return Ok(ValidationResult::duplicate(&request.product_id));
        }
        state.dedup.sweep().await?;
    }

    Ok(outcome)
}

/// OPTIONS /api/v1/purchase/validate, empty 200 for CORS preflight.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
