// src/gateway/http.rs
use super::{Gateway, GatewayError};
use crate::models::chat::{ChatRequest, ChatResponse, HistoryEntry};
use crate::models::file::{UploadKind, UploadResponse, VideoUpload};
use crate::utils::video_mime_type;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Gateway backed by a remote Zuckky backend, e.g. `http://localhost:3000/api`
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(300)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(GatewayError::Rejected(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ))),
            Err(e) => Err(GatewayError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send_chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ChatResponse, GatewayError> {
        let request = ChatRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };

        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&request)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn upload_video(
        &self,
        upload: &VideoUpload,
        kind: UploadKind,
    ) -> Result<UploadResponse, GatewayError> {
        let part = Part::bytes(upload.data.clone())
            .file_name(upload.file_name.clone())
            .mime_str(video_mime_type(&upload.file_name))?;
        let form = Form::new()
            .part("video", part)
            .text("type", kind.as_str());

        tracing::debug!("📤 Uploading {} ({} bytes) as {}", upload.file_name, upload.data.len(), kind);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }
}
