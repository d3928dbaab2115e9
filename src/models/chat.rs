// src/models/chat.rs
use serde::{Deserialize, Serialize};

/// One prior exchange sent along with a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String, // user, assistant
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Chat reply from the backend. Older clients call the fields `reply` / `nextState`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default, alias = "reply", skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, alias = "nextState", skip_serializing_if = "Option::is_none")]
    pub conversation_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn reply(response: String, conversation_state: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response),
            conversation_state: Some(conversation_state.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
