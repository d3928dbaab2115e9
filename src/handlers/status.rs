// src/handlers/status.rs
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "zuckky",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "gemini": state.responder.uses_gemini(),
        "gateway": if state.config.gateway_url.is_some() { "remote" } else { "local" },
        "upload_dir": state.uploads.root().display().to_string(),
    }))
}
