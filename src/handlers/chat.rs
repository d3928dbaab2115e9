// src/handlers/chat.rs
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn chat_routes() -> Router {
    Router::new()
        .route("/api/chat/", post(chat_message))
        .route("/api/chat", post(chat_message))
}

async fn chat_message(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected chat payload: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(ChatResponse::failure(rejection.body_text())),
            );
        }
    };

    tracing::info!("💬 Chat message ({} prior turns): {}", request.history.len(), request.message);
    (StatusCode::OK, Json(state.responder.chat(&request).await))
}
