// src/handlers/process.rs
use crate::models::file::ProcessResponse;
use crate::services::edited_video::process_style;
use crate::services::upload_store::MAX_UPLOAD_BYTES;
use crate::AppState;
use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, Extension, Form, FromRequest, Request},
    http::header::{CONTENT_TYPE, HOST},
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn process_routes() -> Router {
    Router::new()
        .route("/api/process/", post(process_video))
        .route("/api/process", post(process_video))
        // the client may attach the raw video alongside the style
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Deserialize)]
struct StyleForm {
    style: Option<String>,
}

async fn process_video(Extension(state): Extension<Arc<AppState>>, request: Request) -> Json<ProcessResponse> {
    let public_base = match &state.config.public_base_url {
        Some(base) => base.clone(),
        None => {
            let host = request
                .headers()
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost:3000");
            format!("https://{}", host)
        }
    };

    let style = read_style(request).await.unwrap_or_default();
    tracing::info!("🎞️ Edited video requested for style '{}'", style);
    Json(process_style(style.trim(), &public_base))
}

/// `style` from either a multipart or a urlencoded form
async fn read_style(request: Request) -> Option<String> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.ok()?;
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("style") {
                return field.text().await.ok();
            }
        }
        None
    } else {
        let Form(form) = Form::<StyleForm>::from_request(request, &()).await.ok()?;
        form.style
    }
}
