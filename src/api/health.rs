use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
/// Returns JSON with status and config summary.
pub fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "chatbridge is running",
        "config": {
            "backend_base_url": config.backend.base_url,
            "default_model": config.backend.default_model,
            "models_count": config.backend.models.len(),
            "log_level": config.features.log_level,
        }
    }))
}
