use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvbuilder-api"
    }))
}

/// GET /api/v1/renderer/health
/// Reports which render backend is configured and whether it answers.
pub async fn renderer_health_handler(State(state): State<AppState>) -> Json<Value> {
    let available = state.renderer.health_check().await;
    if !available {
        tracing::warn!(backend = state.renderer.backend(), "render engine unavailable");
    }
    Json(json!({
        "backend": state.renderer.backend(),
        "available": available,
        "timeout_secs": state.config.render_timeout.as_secs()
    }))
}
