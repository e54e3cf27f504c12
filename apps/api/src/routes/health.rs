use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus what an export currently costs, so the form can show the price.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "export": {
            "fee": state.config.export_fee,
            "currency": state.config.payment_currency,
            "defaultTheme": state.config.default_theme,
        }
    }))
}
