// src/services/chat_responder.rs
//! Backend side of `/api/chat/`: asks Gemini when configured, otherwise answers from a
//! keyword table, and suggests the conversation state the client should move to.

use crate::gemini_client::GeminiClient;
use crate::models::chat::{ChatRequest, ChatResponse, HistoryEntry};
use crate::utils::{first_match, KeywordRule};

const PERSONA: &str = "You are Zuckky AI, an enthusiastic video editing assistant. You help users create viral videos.

Your personality:
- Energetic and creative 🎬
- Focused on video editing and content creation
- Helpful with uploads, templates, and AI processing
- Use emojis occasionally to be engaging

Keep responses concise and focused on video editing. Guide users through the process.";

/// How many prior exchanges are included in the prompt
const HISTORY_WINDOW: usize = 10;

const FALLBACK_REPLIES: &[KeywordRule<&str>] = &[
    KeywordRule {
        keywords: &["hello", "hi", "hey"],
        outcome: "Hey there! I'm Zuckky AI, your video editing assistant! 🎬 Ready to create some amazing viral content? Just upload your footage and let's get started! 🚀",
    },
    KeywordRule {
        keywords: &["upload", "video", "footage"],
        outcome: "Perfect! 🎥 To begin, please upload your raw video. You can click the upload area or drag & drop your file. I support MP4, MOV, AVI - up to 2GB! Then we'll choose an awesome editing style! ✨",
    },
    KeywordRule {
        keywords: &["template", "style", "viral"],
        outcome: "We've got some killer templates! 🔥 Choose from:\n\n⚡ Alex Hormozi - Fast cuts, bold text, high energy\n🎯 Iman Gadzhi - Cinematic, smooth B-roll\n🎭 Gary Vee - Authentic, raw, engaging\n✨ Custom Style - Upload a reference video to train AI\n\nWhich style speaks to you? 😎",
    },
    KeywordRule {
        keywords: &["edit", "process", "continue"],
        outcome: "I'm ready to work my AI magic! ✨ But first, I need your video footage. Upload your raw video and we'll transform it into viral-ready content together! 🎉",
    },
    KeywordRule {
        keywords: &["help", "how", "what"],
        outcome: "I've got you! Here's the simple process:\n\n1️⃣ Upload your raw video footage\n2️⃣ Choose a viral template style\n3️⃣ Add any special instructions\n4️⃣ Watch as AI creates your professional edit!\n\nYou've got 32 credits ready to use! 💪 What would you like to start with?",
    },
    KeywordRule {
        keywords: &["credit", "price", "cost"],
        outcome: "You're rocking 32 editing credits! 🎉 Each video edit uses just 1 credit. The more you create, the more credits you'll earn! 💫",
    },
];

const DEFAULT_REPLY: &str = "I'm excited to help you create stunning video content! 🎥 To get started, please upload your raw video footage or tell me about the amazing content you want to create! 🚀";

const STATE_HINTS: &[KeywordRule<&str>] = &[
    KeywordRule { keywords: &["upload", "video", "footage"], outcome: "awaiting_upload" },
    KeywordRule { keywords: &["template", "style", "viral"], outcome: "awaiting_template" },
    KeywordRule { keywords: &["reference", "custom", "train"], outcome: "awaiting_reference_video" },
    KeywordRule { keywords: &["instructions", "edit", "process"], outcome: "awaiting_instructions" },
];

/// Token for general chat that should not move the client's workflow
pub const CHATTING_STATE: &str = "chatting";

pub fn fallback_reply(message: &str) -> &'static str {
    first_match(FALLBACK_REPLIES, message).unwrap_or(DEFAULT_REPLY)
}

/// State the client should adopt after this message; `chatting` leaves it alone
pub fn determine_conversation_state(message: &str) -> &'static str {
    first_match(STATE_HINTS, message).unwrap_or(CHATTING_STATE)
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponder {
    gemini: Option<GeminiClient>,
}

impl ChatResponder {
    pub fn new(gemini: Option<GeminiClient>) -> Self {
        Self { gemini }
    }

    pub fn uses_gemini(&self) -> bool {
        self.gemini.is_some()
    }

    pub async fn chat(&self, request: &ChatRequest) -> ChatResponse {
        let reply = self.reply(&request.message, &request.history).await;
        ChatResponse::reply(reply, determine_conversation_state(&request.message))
    }

    async fn reply(&self, message: &str, history: &[HistoryEntry]) -> String {
        let Some(gemini) = &self.gemini else {
            return fallback_reply(message).to_string();
        };

        tracing::info!("💬 Sending to Gemini: {}", message);
        match gemini.generate_text(&build_prompt(message, history)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("❌ Gemini API error: {}", e);
                fallback_reply(message).to_string()
            }
        }
    }
}

fn build_prompt(message: &str, history: &[HistoryEntry]) -> String {
    let mut prompt = String::from(PERSONA);
    prompt.push_str("\n\n");

    let skip = history.len().saturating_sub(HISTORY_WINDOW);
    for entry in history.iter().skip(skip) {
        let speaker = if entry.role == "user" { "User" } else { "Zuckky AI" };
        prompt.push_str(&format!("{}: {}\n", speaker, entry.content));
    }

    prompt.push_str(&format!("\nUser: {}\n\nZuckky AI:", message));
    prompt
}
