// src/gateway/local.rs
use super::{Gateway, GatewayError};
use crate::models::chat::{ChatRequest, ChatResponse, HistoryEntry};
use crate::models::file::{UploadKind, UploadResponse, VideoUpload};
use crate::services::{ChatResponder, UploadStore};
use async_trait::async_trait;

/// Gateway served by the backend services in this process, skipping the HTTP hop
#[derive(Debug, Clone)]
pub struct LocalGateway {
    responder: ChatResponder,
    uploads: UploadStore,
}

impl LocalGateway {
    pub fn new(responder: ChatResponder, uploads: UploadStore) -> Self {
        Self { responder, uploads }
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    async fn send_chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ChatResponse, GatewayError> {
        let request = ChatRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };
        Ok(self.responder.chat(&request).await)
    }

    async fn upload_video(
        &self,
        upload: &VideoUpload,
        kind: UploadKind,
    ) -> Result<UploadResponse, GatewayError> {
        match self.uploads.save(kind, &upload.file_name, &upload.data).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!("Upload of {} rejected: {}", upload.file_name, e);
                Ok(UploadResponse::failure(e.to_string()))
            }
        }
    }
}
