// src/handlers/mod.rs
pub mod chat;
pub mod process;
pub mod session;
pub mod status;
pub mod upload;

use crate::middleware::logging::request_logging_middleware;
use crate::AppState;
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Every route the server exposes, with logging, CORS and shared state applied
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(chat::chat_routes())
        .merge(upload::upload_routes())
        .merge(process::process_routes())
        .merge(session::session_routes())
        .merge(status::status_routes())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
