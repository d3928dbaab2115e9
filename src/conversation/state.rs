// src/conversation/state.rs
//! Session record: current conversation state, the user's selections and the transcript

use crate::conversation::templates::Template;
use crate::models::chat::HistoryEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Where the conversation is. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Welcome,
    AwaitingUpload,
    AwaitingTemplate,
    AwaitingReferenceVideo,
    AwaitingInstructions,
    Processing,
    Finished,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Welcome => "welcome",
            ConversationState::AwaitingUpload => "awaiting_upload",
            ConversationState::AwaitingTemplate => "awaiting_template",
            ConversationState::AwaitingReferenceVideo => "awaiting_reference_video",
            ConversationState::AwaitingInstructions => "awaiting_instructions",
            ConversationState::Processing => "processing",
            ConversationState::Finished => "finished",
        }
    }

    /// States the backend may move us into. Processing and Finished belong to the simulator.
    pub fn adoptable_from_gateway(&self) -> bool {
        !matches!(self, ConversationState::Processing | ConversationState::Finished)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "welcome" => Ok(ConversationState::Welcome),
            "awaiting_upload" => Ok(ConversationState::AwaitingUpload),
            "awaiting_template" => Ok(ConversationState::AwaitingTemplate),
            "awaiting_reference_video" => Ok(ConversationState::AwaitingReferenceVideo),
            "awaiting_instructions" => Ok(ConversationState::AwaitingInstructions),
            "processing" => Ok(ConversationState::Processing),
            "finished" => Ok(ConversationState::Finished),
            other => Err(format!("unknown conversation state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory record of one conversation. Nothing here outlives the connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    pub selected_template: Option<Template>,
    pub main_video_ref: Option<String>,
    /// Only populated when the Custom template is selected
    pub reference_video_ref: Option<String>,
    pub instructions: Option<String>,
    /// Append-only
    pub message_log: Vec<TranscriptMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: ConversationState::Welcome,
            selected_template: None,
            main_video_ref: None,
            reference_video_ref: None,
            instructions: None,
            message_log: Vec::new(),
        }
    }

    pub fn record(&mut self, role: Role, text: impl Into<String>) {
        self.message_log.push(TranscriptMessage {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn transition(&mut self, next: ConversationState) {
        if self.state != next {
            tracing::debug!("🔀 Conversation state {} -> {}", self.state, next);
        }
        self.state = next;
    }

    /// Transcript in the shape the chat backend expects
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.message_log
            .iter()
            .map(|message| HistoryEntry {
                role: message.role.as_str().to_string(),
                content: message.text.clone(),
            })
            .collect()
    }

    pub fn last_assistant_message(&self) -> Option<&TranscriptMessage> {
        self.message_log.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Session handle shared by the state machine and the simulator's completion step
pub type SharedSession = Arc<Mutex<Session>>;

pub fn shared_session() -> SharedSession {
    Arc::new(Mutex::new(Session::new()))
}
