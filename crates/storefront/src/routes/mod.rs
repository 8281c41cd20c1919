//! HTTP route handlers for the storefront service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (backend reachable)
//!
//! # Pass-through API
//! GET  /api/categories         - Backend category list
//! GET  /api/categories/{id}    - One category from that list, 404 if absent
//! ```

pub mod categories;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the pass-through API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::index))
        .route("/categories/{id}", get(categories::show))
}

/// Full application router with tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "backend not reachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
