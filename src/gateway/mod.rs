// src/gateway/mod.rs
//! Backend seen from the conversation: free-text chat and video upload

use crate::models::chat::{ChatResponse, HistoryEntry};
use crate::models::file::{UploadKind, UploadResponse, VideoUpload};
use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod local;

pub use http::HttpGateway;
pub use local::LocalGateway;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_chat(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<ChatResponse, GatewayError>;

    async fn upload_video(
        &self,
        upload: &VideoUpload,
        kind: UploadKind,
    ) -> Result<UploadResponse, GatewayError>;
}
