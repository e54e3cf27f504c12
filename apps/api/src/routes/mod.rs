pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::export::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV API
        .route("/api/v1/cv/layout", post(handlers::handle_layout))
        .route("/api/v1/cv/export", post(handlers::handle_export))
        // Payments API
        .route(
            "/api/v1/payments/initialize",
            post(handlers::handle_initialize_payment),
        )
        .route(
            "/api/v1/payments/verify/:reference",
            get(handlers::handle_verify_payment),
        )
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
