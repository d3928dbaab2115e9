// src/models/file.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which upload slot a video fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// Raw footage to be edited
    Main,
    /// Style reference for the Custom template
    Reference,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Main => "main",
            UploadKind::Reference => "reference",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(UploadKind::Main),
            "reference" => Ok(UploadKind::Reference),
            other => Err(format!("unknown upload type '{}'", other)),
        }
    }
}

/// A video picked by the user, ready to send to the backend
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl VideoUpload {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<UploadKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Result of an upload as seen by the conversation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    /// Storage reference returned by the backend
    #[serde(default, alias = "file_path")]
    pub reference: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl UploadOutcome {
    pub fn stored(reference: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            success: true,
            reference: Some(reference.into()),
            file_name: Some(file_name.into()),
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }
}

impl From<UploadResponse> for UploadOutcome {
    fn from(response: UploadResponse) -> Self {
        // success without a path leaves nothing to reference later
        let success = response.success && response.file_path.is_some();
        Self {
            success,
            reference: response.file_path,
            file_name: response.file_name,
        }
    }
}

/// Reply from `/api/process/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_video_url: Option<String>,
    pub message: String,
}
