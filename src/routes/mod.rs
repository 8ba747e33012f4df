// Route modules
pub mod purchase;

use crate::{app_state::AppState, middleware::logging_middleware};
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::post,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors_layer())
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new().route(
        "/purchase/validate",
        post(purchase::validate_purchase)
            .options(purchase::preflight)
            .fallback(purchase::method_not_allowed),
    )
}

/// Any origin may call the validation endpoint; browsers preflight with
/// the app-version/platform headers the clients attach.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-app-version"),
            HeaderName::from_static("x-platform"),
        ])
}
