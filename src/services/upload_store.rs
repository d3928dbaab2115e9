// src/services/upload_store.rs
use crate::models::file::{UploadKind, UploadResponse};
use crate::utils::{file_extension, sanitize_file_name};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No video file provided")]
    MissingFile,
    #[error("Invalid file name")]
    InvalidFileName,
    #[error("Unsupported video format: {0}")]
    UnsupportedFormat(String),
    #[error("File too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "wmv", "flv", "webm", "mkv", "m4v"];

/// 2GB, matching what the upload widget advertises
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

pub fn is_video_file(name: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&file_extension(name).as_str())
}

/// Saves uploaded videos under `{root}/{kind}/{name}`
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(
        &self,
        kind: UploadKind,
        file_name: &str,
        data: &[u8],
    ) -> Result<UploadResponse, UploadError> {
        let file_name = sanitize_file_name(file_name).ok_or(UploadError::InvalidFileName)?;
        if !is_video_file(&file_name) {
            return Err(UploadError::UnsupportedFormat(file_extension(&file_name)));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size: data.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let dir = self.root.join(kind.as_str());
        fs::create_dir_all(&dir).await?;

        let path = self.free_path(&dir, &file_name).await;
        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        let stored = path.to_string_lossy().replace('\\', "/");
        tracing::info!("📥 Stored {} upload {} ({} bytes) at {}", kind, file_name, data.len(), stored);

        Ok(UploadResponse {
            success: true,
            file_path: Some(stored),
            file_name: Some(file_name),
            file_size: Some(data.len() as u64),
            kind: Some(kind),
            error: None,
        })
    }

    /// Never overwrite an earlier upload with the same name
    async fn free_path(&self, dir: &Path, file_name: &str) -> PathBuf {
        let candidate = dir.join(file_name);
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }

        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video");
        let suffix = &Uuid::new_v4().simple().to_string()[..7];
        let extension = file_extension(file_name);
        dir.join(format!("{}_{}.{}", stem, suffix, extension))
    }
}
