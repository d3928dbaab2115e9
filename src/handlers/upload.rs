// src/handlers/upload.rs
use crate::models::file::{UploadKind, UploadResponse};
use crate::services::upload_store::{UploadError, MAX_UPLOAD_BYTES};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::Multipart, DefaultBodyLimit, Extension},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn upload_routes() -> Router {
    Router::new()
        .route("/api/upload/", post(upload_video))
        .route("/api/upload", post(upload_video))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Multipart fields: `video` (the file) and `type` (`main` or `reference`, default `main`)
async fn upload_video(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    let mut kind = UploadKind::Main;
    let mut video: Option<(String, Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart upload: {}", e);
                return failure(StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e));
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("video") => {
                let file_name = field.file_name().unwrap_or("video.mp4").to_string();
                match field.bytes().await {
                    Ok(data) => video = Some((file_name, data)),
                    Err(e) => {
                        tracing::error!("Failed to read upload body for '{}': {}", file_name, e);
                        return failure(StatusCode::BAD_REQUEST, format!("Failed to read upload: {}", e));
                    }
                }
            }
            Some("type") => {
                let text = field.text().await.unwrap_or_default();
                kind = match text.parse() {
                    Ok(kind) => kind,
                    Err(e) => return failure(StatusCode::BAD_REQUEST, e),
                };
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = video else {
        return failure(StatusCode::BAD_REQUEST, UploadError::MissingFile.to_string());
    };

    tracing::info!("📁 Uploading {} ({} bytes) as {}", file_name, data.len(), kind);
    match state.uploads.save(kind, &file_name, &data).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            let status = match e {
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            tracing::warn!("Upload of '{}' rejected: {}", file_name, e);
            failure(status, e.to_string())
        }
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<UploadResponse>) {
    (status, Json(UploadResponse::failure(error)))
}
