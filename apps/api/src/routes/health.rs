use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status and which store adapter is wired in. Never touches the database.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "testimonials-api",
        "store": {
            "backend": state.config.store_backend.as_str(),
            "configured": state.store.is_ok(),
            "error": state.store.as_ref().err().map(|e| e.to_string()),
        }
    }))
}
