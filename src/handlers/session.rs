// src/handlers/session.rs
//! `/ws`: one conversation per connection. Client frames drive the conversation in order;
//! everything the presenter emits is streamed back as JSON frames.

use crate::conversation::templates::Template;
use crate::conversation::Conversation;
use crate::models::file::{UploadKind, UploadOutcome, VideoUpload};
use crate::presentation::ChannelPresenter;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// What the browser can ask of its conversation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Message {
        text: String,
    },
    StartUpload,
    BrowseTemplates,
    Help,
    SelectTemplate {
        template: Template,
    },
    /// Small files only; large videos go through `/api/upload/` and report back with `UploadResult`
    Upload {
        kind: UploadKind,
        file_name: String,
        data_base64: String,
    },
    UploadResult {
        kind: UploadKind,
        success: bool,
        #[serde(default)]
        file_path: Option<String>,
        #[serde(default)]
        file_name: Option<String>,
    },
    Restart,
}

pub fn session_routes() -> Router {
    Router::new().route("/ws", get(websocket_handler))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket(socket, state))
}

async fn websocket(stream: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = stream.split();

    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("🔌 Started new chat session: {}", session_id);

    let (presenter, mut events) = ChannelPresenter::channel();
    let mut conversation = state.conversation(Arc::new(presenter));

    // Frames are applied one at a time, in arrival order, while events keep streaming out
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<ClientFrame>();
    let worker = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            apply_frame(&mut conversation, frame).await;
        }
    });

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let message = match incoming {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error in session {}: {}", session_id, e);
                        break;
                    }
                    None => break,
                };

                match message {
                    Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => {
                            tracing::debug!("📥 Frame in session {}: {:?}", session_id, frame_kind(&frame));
                            if frame_tx.send(frame).is_err() {
                                tracing::error!("Conversation worker for session {} is gone", session_id);
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("Ignoring malformed frame in session {}: {}", session_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }

            Some(event) = events.recv() => {
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            tracing::warn!("Failed to send event to WebSocket in session {}", session_id);
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize UI event: {}", e),
                }
            }
        }
    }

    // Dropping the conversation cancels any processing run still on the clock
    drop(frame_tx);
    worker.abort();
    tracing::info!("🔌 WebSocket handler exiting for session: {}", session_id);
}

fn frame_kind(frame: &ClientFrame) -> &'static str {
    match frame {
        ClientFrame::Message { .. } => "message",
        ClientFrame::StartUpload => "start_upload",
        ClientFrame::BrowseTemplates => "browse_templates",
        ClientFrame::Help => "help",
        ClientFrame::SelectTemplate { .. } => "select_template",
        ClientFrame::Upload { .. } => "upload",
        ClientFrame::UploadResult { .. } => "upload_result",
        ClientFrame::Restart => "restart",
    }
}

pub async fn apply_frame(conversation: &mut Conversation, frame: ClientFrame) {
    match frame {
        ClientFrame::Message { text } => conversation.handle_user_input(&text).await,
        ClientFrame::StartUpload => conversation.start_upload().await,
        ClientFrame::BrowseTemplates => conversation.browse_templates().await,
        ClientFrame::Help => conversation.show_help().await,
        ClientFrame::SelectTemplate { template } => conversation.select_template(template).await,
        ClientFrame::Upload {
            kind,
            file_name,
            data_base64,
        } => match STANDARD.decode(data_base64.as_bytes()) {
            Ok(data) => {
                conversation
                    .upload_video(kind, VideoUpload::new(file_name, data))
                    .await
            }
            Err(e) => {
                tracing::warn!("Upload frame for {} is not valid base64: {}", file_name, e);
                conversation.handle_upload_result(kind, UploadOutcome::failed()).await
            }
        },
        ClientFrame::UploadResult {
            kind,
            success,
            file_path,
            file_name,
        } => {
            let outcome = UploadOutcome {
                success,
                reference: file_path,
                file_name,
            };
            conversation.handle_upload_result(kind, outcome).await
        }
        ClientFrame::Restart => conversation.restart().await,
    }
}
