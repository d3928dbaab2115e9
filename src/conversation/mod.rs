// src/conversation/mod.rs
//! Conversation state machine. Decides, for every user action, whether to answer locally
//! or ask the backend, keeps the session up to date and tells the presenter what to draw.

use crate::gateway::Gateway;
use crate::models::chat::ChatResponse;
use crate::models::file::{UploadKind, UploadOutcome, VideoUpload};
use crate::presentation::Presenter;
use crate::processing::{ProcessingSimulator, SimulatorConfig};
use std::sync::Arc;

pub mod state;
pub mod templates;

use state::{shared_session, ConversationState, Role, Session, SharedSession};
use templates::{classify_welcome_intent, resolve_template, Template, WelcomeIntent};

pub const UPLOAD_PROMPT: &str =
    "Great! Let's get started. Please upload your raw video footage. You can drag and drop or click to browse.";
pub const TEMPLATE_PROMPT: &str = "Browse and choose a viral template style or create your own:";
pub const HELP_TEXT: &str = "I'm here to help! Here's how Zuckky works:\n\n\
    1️⃣ Upload your raw video\n2️⃣ Select your template style\n3️⃣ Add any custom instructions\n\
    4️⃣ Get your professionally edited video in seconds!\n\nWhat would you like to start with?";
pub const MAIN_VIDEO_RECEIVED: &str =
    "🎉 Video received! Now, choose your editing style:\n\nWhich viral template would you like to use?";
pub const REFERENCE_VIDEO_RECEIVED: &str = "✅ Reference video received! The AI is now trained with your unique editing style.\n\n\
    What specific instructions would you like me to apply to your video?";
pub const UPLOAD_FAILED: &str = "Sorry, there was an error uploading your video. Please try again.";
pub const CUSTOM_TEMPLATE_GUIDANCE: &str = "Awesome choice! Creating a custom style makes your content unique. \
    Please upload a reference video that has the editing style you want to replicate.";
pub const UNRESOLVED_TEMPLATE: &str = "I'm not sure which style you meant. Please select from these viral templates:";
pub const WELCOME_FALLBACK: &str = "Welcome to Zuckky! I can help you create amazing viral videos. \
    Would you like to upload a video or browse templates?";
pub const CONTINUE_FALLBACK: &str = "Let's continue with your video edit! What would you like to do next?";
pub const BUSY_MESSAGE: &str = "Hang tight, I'm still editing your video! It'll be ready in a moment. ⏳";
pub const REFERENCE_NEEDS_CUSTOM: &str =
    "Reference videos are only used by the Custom style. Pick \"Custom\" first if you'd like to train your own look!";

pub fn template_guidance(template: Template) -> String {
    format!(
        "Perfect! The {} style is amazing for viral content! 🎯\n\n\
         Now, what specific instructions would you like me to apply? For example:\n\
         • Add dynamic captions\n• Include background music\n• Create quick cuts\n• Add transitions\n\
         • Any other special requests?",
        template
    )
}

pub fn instructions_acknowledgement(instructions: &str) -> String {
    format!(
        "Got it! I'll apply these instructions: \"{}\". Starting the video editing process now... 🚀",
        instructions
    )
}

/// One user's conversation. Every operation takes `&mut self`, so inputs are handled one
/// at a time in the order they are submitted.
pub struct Conversation {
    session: SharedSession,
    gateway: Arc<dyn Gateway>,
    presenter: Arc<dyn Presenter>,
    simulator: ProcessingSimulator,
}

impl Conversation {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        presenter: Arc<dyn Presenter>,
        simulator_config: SimulatorConfig,
    ) -> Self {
        let session = shared_session();
        let simulator = ProcessingSimulator::new(simulator_config, presenter.clone(), session.clone());
        Self {
            session,
            gateway,
            presenter,
            simulator,
        }
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn state(&self) -> ConversationState {
        self.session.lock().await.state
    }

    /// Free text typed into the chat box
    pub async fn handle_user_input(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let state = {
            let mut session = self.session.lock().await;
            self.user_says(&mut session, text);
            session.state
        };
        tracing::info!("📤 State: {}, Message: {}", state, text);

        match state {
            ConversationState::AwaitingInstructions => self.apply_instructions(text).await,
            ConversationState::AwaitingTemplate => match resolve_template(text) {
                Some(template) => self.select_template(template).await,
                None => {
                    let mut session = self.session.lock().await;
                    self.assistant_says(&mut session, UNRESOLVED_TEMPLATE);
                    self.presenter.render_template_catalog(&Template::CATALOG);
                }
            },
            _ => self.delegate_to_gateway(text, state).await,
        }
    }

    /// A template card was picked (or template text was resolved)
    pub async fn select_template(&mut self, template: Template) {
        let mut session = self.session.lock().await;
        if self.refuse_while_processing(&mut session) {
            return;
        }

        session.selected_template = Some(template);
        self.user_says(&mut session, &format!("{} Style Selected", template));

        if template.is_custom() {
            self.assistant_says(&mut session, CUSTOM_TEMPLATE_GUIDANCE);
            session.transition(ConversationState::AwaitingReferenceVideo);
            self.presenter.render_upload_affordance(UploadKind::Reference);
        } else {
            session.reference_video_ref = None;
            self.assistant_says(&mut session, &template_guidance(template));
            session.transition(ConversationState::AwaitingInstructions);
        }
    }

    /// Send a picked file to the backend, then continue as `handle_upload_result`
    pub async fn upload_video(&mut self, kind: UploadKind, upload: VideoUpload) {
        {
            let mut session = self.session.lock().await;
            if self.refuse_while_processing(&mut session) {
                return;
            }
            self.user_says(
                &mut session,
                &format!("Uploading {} ({:.2} MB)...", upload.file_name, upload.size_mb()),
            );
        }

        let outcome = match self.gateway.upload_video(&upload, kind).await {
            Ok(response) => {
                if !response.success {
                    tracing::warn!(
                        "Upload of {} failed: {}",
                        upload.file_name,
                        response.error.as_deref().unwrap_or("no reason given")
                    );
                }
                let mut outcome = UploadOutcome::from(response);
                if outcome.file_name.is_none() {
                    outcome.file_name = Some(upload.file_name.clone());
                }
                outcome
            }
            Err(e) => {
                tracing::error!("❌ Upload error for {}: {}", upload.file_name, e);
                UploadOutcome::failed()
            }
        };

        self.handle_upload_result(kind, outcome).await;
    }

    /// Upload finished, either through `upload_video` or directly from the UI
    pub async fn handle_upload_result(&mut self, kind: UploadKind, outcome: UploadOutcome) {
        let mut session = self.session.lock().await;
        if self.refuse_while_processing(&mut session) {
            return;
        }

        let reference = match outcome.reference {
            Some(reference) if outcome.success => reference,
            _ => {
                self.assistant_says(&mut session, UPLOAD_FAILED);
                return;
            }
        };

        if kind == UploadKind::Reference && session.selected_template != Some(Template::Custom) {
            if session.state != ConversationState::AwaitingReferenceVideo {
                tracing::warn!("Reference upload {} arrived without the Custom template", reference);
                self.assistant_says(&mut session, REFERENCE_NEEDS_CUSTOM);
                return;
            }
            // the backend asked for a reference without a template pick
            session.selected_template = Some(Template::Custom);
        }

        let file_name = outcome
            .file_name
            .unwrap_or_else(|| reference.rsplit('/').next().unwrap_or(&reference).to_string());

        match kind {
            UploadKind::Main => session.main_video_ref = Some(reference),
            UploadKind::Reference => session.reference_video_ref = Some(reference),
        }
        self.user_says(&mut session, &format!("{} uploaded successfully!", file_name));

        match kind {
            UploadKind::Main => {
                self.assistant_says(&mut session, MAIN_VIDEO_RECEIVED);
                session.transition(ConversationState::AwaitingTemplate);
                self.presenter.render_template_catalog(&Template::CATALOG);
            }
            UploadKind::Reference => {
                self.assistant_says(&mut session, REFERENCE_VIDEO_RECEIVED);
                session.transition(ConversationState::AwaitingInstructions);
            }
        }
    }

    /// Welcome screen: "upload a video"
    pub async fn start_upload(&mut self) {
        let mut session = self.session.lock().await;
        if self.refuse_while_processing(&mut session) {
            return;
        }
        self.assistant_says(&mut session, UPLOAD_PROMPT);
        self.presenter.render_upload_affordance(UploadKind::Main);
        session.transition(ConversationState::AwaitingUpload);
    }

    /// Welcome screen: "browse templates"
    pub async fn browse_templates(&mut self) {
        let mut session = self.session.lock().await;
        if self.refuse_while_processing(&mut session) {
            return;
        }
        self.assistant_says(&mut session, TEMPLATE_PROMPT);
        self.presenter.render_template_catalog(&Template::CATALOG);
        session.transition(ConversationState::AwaitingTemplate);
    }

    pub async fn show_help(&mut self) {
        let mut session = self.session.lock().await;
        self.assistant_says(&mut session, HELP_TEXT);
    }

    /// Drop everything and go back to the welcome screen
    pub async fn restart(&mut self) {
        self.simulator.cancel();
        let mut session = self.session.lock().await;
        *session = Session::new();
        self.presenter.reset_transcript();
        tracing::info!("🔄 Conversation restarted");
    }

    async fn apply_instructions(&mut self, instructions: &str) {
        let mut session = self.session.lock().await;
        session.instructions = Some(instructions.to_string());
        self.assistant_says(&mut session, &instructions_acknowledgement(instructions));

        tracing::info!(
            main_video = ?session.main_video_ref,
            reference_video = ?session.reference_video_ref,
            template = ?session.selected_template.map(|t| t.name()),
            instructions = %instructions,
            "🚀 Starting video processing"
        );
        match self.simulator.start() {
            Ok(()) => session.transition(ConversationState::Processing),
            Err(e) => tracing::warn!("Could not show processing progress, staying in {}: {}", session.state, e),
        }
    }

    async fn delegate_to_gateway(&mut self, text: &str, state_before: ConversationState) {
        let history = {
            let session = self.session.lock().await;
            let mut history = session.history();
            // the message being sent was just logged
            history.pop();
            history
        };

        match self.gateway.send_chat(text, &history).await {
            Ok(response) if response.success && response.response.is_some() => {
                self.apply_chat_response(response, state_before).await;
            }
            Ok(response) => {
                tracing::warn!(
                    "Chat backend declined: {}",
                    response.error.as_deref().unwrap_or("no reply")
                );
                self.fallback(text).await;
            }
            Err(e) => {
                tracing::error!("❌ Network error: {}", e);
                self.fallback(text).await;
            }
        }
    }

    async fn apply_chat_response(&mut self, response: ChatResponse, state_before: ConversationState) {
        let mut session = self.session.lock().await;
        if let Some(reply) = response.response.as_deref() {
            self.assistant_says(&mut session, reply);
        }

        let Some(token) = response.conversation_state.as_deref() else {
            return;
        };
        let next = match token.parse::<ConversationState>() {
            Ok(next) => next,
            Err(_) => {
                tracing::debug!("Keeping state {} for backend state '{}'", session.state, token);
                return;
            }
        };

        if session.state != state_before {
            tracing::warn!(
                "Discarding stale backend state {}: conversation moved {} -> {} while waiting",
                next,
                state_before,
                session.state
            );
            return;
        }
        if session.state == ConversationState::Processing || !next.adoptable_from_gateway() {
            tracing::debug!("Backend state {} not adopted from {}", next, session.state);
            return;
        }
        if next == session.state {
            return;
        }

        session.transition(next);
        match next {
            ConversationState::AwaitingUpload => {
                self.presenter.render_upload_affordance(UploadKind::Main)
            }
            ConversationState::AwaitingTemplate => {
                self.presenter.render_template_catalog(&Template::CATALOG)
            }
            ConversationState::AwaitingReferenceVideo => {
                self.presenter.render_upload_affordance(UploadKind::Reference)
            }
            _ => {}
        }
    }

    /// Local stand-in for the backend when it fails
    async fn fallback(&mut self, text: &str) {
        let state = self.session.lock().await.state;
        if state != ConversationState::Welcome {
            let mut session = self.session.lock().await;
            self.assistant_says(&mut session, CONTINUE_FALLBACK);
            return;
        }

        match classify_welcome_intent(text) {
            Some(WelcomeIntent::StartUpload) => self.start_upload().await,
            Some(WelcomeIntent::BrowseTemplates) => self.browse_templates().await,
            None => {
                let mut session = self.session.lock().await;
                self.assistant_says(&mut session, WELCOME_FALLBACK);
            }
        }
    }

    fn refuse_while_processing(&self, session: &mut Session) -> bool {
        if session.state == ConversationState::Processing {
            self.assistant_says(session, BUSY_MESSAGE);
            return true;
        }
        false
    }

    fn assistant_says(&self, session: &mut Session, text: &str) {
        session.record(Role::Assistant, text);
        self.presenter.append_assistant_message(text);
    }

    fn user_says(&self, session: &mut Session, text: &str) {
        session.record(Role::User, text);
        self.presenter.append_user_message(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, LocalGateway};
    use crate::models::chat::HistoryEntry;
    use crate::models::file::UploadResponse;
    use crate::presentation::{ChannelPresenter, UiEvent};
    use crate::processing::RESULT_MESSAGE;
    use crate::services::{ChatResponder, UploadStore};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Gateway that replays canned answers and records what it was asked
    #[derive(Default)]
    struct ScriptedGateway {
        chats: StdMutex<VecDeque<Result<ChatResponse, GatewayError>>>,
        uploads: StdMutex<VecDeque<Result<UploadResponse, GatewayError>>>,
        chat_calls: AtomicUsize,
        last_history: StdMutex<Vec<HistoryEntry>>,
        /// Moves the session while a chat call is in flight
        interfere: StdMutex<Option<(SharedSession, ConversationState)>>,
    }

    impl ScriptedGateway {
        fn replying(responses: Vec<Result<ChatResponse, GatewayError>>) -> Self {
            Self {
                chats: StdMutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn uploading(responses: Vec<Result<UploadResponse, GatewayError>>) -> Self {
            Self {
                uploads: StdMutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.chat_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        async fn send_chat(
            &self,
            _message: &str,
            history: &[HistoryEntry],
        ) -> Result<ChatResponse, GatewayError> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_history.lock().unwrap() = history.to_vec();

            let interfere = self.interfere.lock().unwrap().take();
            if let Some((session, state)) = interfere {
                session.lock().await.transition(state);
            }

            self.chats
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Rejected("no script".to_string())))
        }

        async fn upload_video(
            &self,
            _upload: &VideoUpload,
            _kind: UploadKind,
        ) -> Result<UploadResponse, GatewayError> {
            self.uploads
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Rejected("no script".to_string())))
        }
    }

    fn new_conversation(gateway: Arc<ScriptedGateway>) -> (Conversation, UnboundedReceiver<UiEvent>) {
        let (presenter, rx) = ChannelPresenter::channel();
        let conversation = Conversation::new(gateway, Arc::new(presenter), SimulatorConfig::default());
        (conversation, rx)
    }

    async fn conversation_in(
        state: ConversationState,
        gateway: Arc<ScriptedGateway>,
    ) -> (Conversation, UnboundedReceiver<UiEvent>) {
        let (conversation, rx) = new_conversation(gateway);
        conversation.session.lock().await.transition(state);
        (conversation, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn assistant_texts(events: &[UiEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                UiEvent::AssistantMessage { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn user_texts(events: &[UiEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                UiEvent::UserMessage { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn catalog_rendered(events: &[UiEvent]) -> bool {
        events.iter().any(|e| matches!(e, UiEvent::TemplateCatalog { .. }))
    }

    #[tokio::test]
    async fn test_template_text_resolves_locally() {
        for (text, expected) in [
            ("I want hormozi", Template::AlexHormozi),
            ("ALEX please", Template::AlexHormozi),
            ("Iman Gadzhi", Template::ImanGadzhi),
            ("gary vee style", Template::GaryVee),
        ] {
            let gateway = Arc::new(ScriptedGateway::default());
            let (mut conversation, mut rx) =
                conversation_in(ConversationState::AwaitingTemplate, gateway.clone()).await;

            conversation.handle_user_input(text).await;

            let session = conversation.snapshot().await;
            assert_eq!(session.selected_template, Some(expected), "input {:?}", text);
            assert_eq!(session.state, ConversationState::AwaitingInstructions);
            assert_eq!(gateway.calls(), 0);

            let events = drain(&mut rx);
            assert_eq!(assistant_texts(&events), vec![template_guidance(expected)]);
            assert_eq!(user_texts(&events)[1], format!("{} Style Selected", expected));
        }
    }

    #[tokio::test]
    async fn test_unrecognized_template_text_re_renders_catalog() {
        let gateway = Arc::new(ScriptedGateway::default());
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingTemplate, gateway.clone()).await;

        conversation.handle_user_input("something trendy").await;

        assert_eq!(conversation.state().await, ConversationState::AwaitingTemplate);
        assert_eq!(gateway.calls(), 0);
        let events = drain(&mut rx);
        assert_eq!(assistant_texts(&events), vec![UNRESOLVED_TEMPLATE.to_string()]);
        assert!(catalog_rendered(&events));
    }

    #[tokio::test]
    async fn test_custom_template_asks_for_reference_video() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingTemplate, Arc::new(ScriptedGateway::default())).await;

        conversation.select_template(Template::Custom).await;

        assert_eq!(conversation.state().await, ConversationState::AwaitingReferenceVideo);
        let events = drain(&mut rx);
        assert_eq!(assistant_texts(&events), vec![CUSTOM_TEMPLATE_GUIDANCE.to_string()]);
        assert!(events.contains(&UiEvent::UploadAffordance { kind: UploadKind::Reference }));
    }

    #[tokio::test]
    async fn test_main_upload_moves_to_template_choice() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingUpload, Arc::new(ScriptedGateway::default())).await;

        conversation
            .handle_upload_result(UploadKind::Main, UploadOutcome::stored("uploads/main/raw.mp4", "raw.mp4"))
            .await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::AwaitingTemplate);
        assert_eq!(session.main_video_ref.as_deref(), Some("uploads/main/raw.mp4"));

        let events = drain(&mut rx);
        assert_eq!(user_texts(&events), vec!["raw.mp4 uploaded successfully!".to_string()]);
        assert_eq!(assistant_texts(&events), vec![MAIN_VIDEO_RECEIVED.to_string()]);
        assert!(catalog_rendered(&events));
    }

    #[tokio::test]
    async fn test_reference_upload_moves_to_instructions() {
        let (mut conversation, mut rx) = new_conversation(Arc::new(ScriptedGateway::default()));
        conversation.select_template(Template::Custom).await;
        drain(&mut rx);

        conversation
            .handle_upload_result(
                UploadKind::Reference,
                UploadOutcome::stored("uploads/reference/style.mov", "style.mov"),
            )
            .await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::AwaitingInstructions);
        assert_eq!(session.reference_video_ref.as_deref(), Some("uploads/reference/style.mov"));
        assert_eq!(assistant_texts(&drain(&mut rx)), vec![REFERENCE_VIDEO_RECEIVED.to_string()]);
    }

    #[tokio::test]
    async fn test_reference_upload_requires_custom_template() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingUpload, Arc::new(ScriptedGateway::default())).await;

        conversation
            .handle_upload_result(UploadKind::Reference, UploadOutcome::stored("uploads/reference/a.mp4", "a.mp4"))
            .await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::AwaitingUpload);
        assert!(session.reference_video_ref.is_none());
        assert_eq!(assistant_texts(&drain(&mut rx)), vec![REFERENCE_NEEDS_CUSTOM.to_string()]);
    }

    #[tokio::test]
    async fn test_reference_requested_by_backend_accepts_upload() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(LocalGateway::new(ChatResponder::default(), UploadStore::new(dir.path())));
        let (presenter, mut rx) = ChannelPresenter::channel();
        let mut conversation = Conversation::new(gateway, Arc::new(presenter), SimulatorConfig::default());

        conversation.handle_user_input("I have a reference clip to train on").await;
        assert_eq!(conversation.state().await, ConversationState::AwaitingReferenceVideo);
        assert!(drain(&mut rx).contains(&UiEvent::UploadAffordance { kind: UploadKind::Reference }));

        conversation
            .handle_upload_result(
                UploadKind::Reference,
                UploadOutcome::stored("uploads/reference/look.mov", "look.mov"),
            )
            .await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::AwaitingInstructions);
        assert_eq!(session.selected_template, Some(Template::Custom));
        assert_eq!(session.reference_video_ref.as_deref(), Some("uploads/reference/look.mov"));
        assert_eq!(assistant_texts(&drain(&mut rx)), vec![REFERENCE_VIDEO_RECEIVED.to_string()]);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_state() {
        for state in [ConversationState::AwaitingUpload, ConversationState::AwaitingReferenceVideo] {
            let (mut conversation, mut rx) =
                conversation_in(state, Arc::new(ScriptedGateway::default())).await;

            let kind = match state {
                ConversationState::AwaitingUpload => UploadKind::Main,
                _ => UploadKind::Reference,
            };
            conversation.handle_upload_result(kind, UploadOutcome::failed()).await;

            assert_eq!(conversation.state().await, state);
            assert_eq!(assistant_texts(&drain(&mut rx)), vec![UPLOAD_FAILED.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_upload_video_goes_through_gateway() {
        let gateway = Arc::new(ScriptedGateway::uploading(vec![
            Ok(UploadResponse::failure("Unsupported file format: txt")),
            Ok(UploadResponse {
                success: true,
                file_path: Some("uploads/main/raw.mp4".to_string()),
                ..Default::default()
            }),
        ]));
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingUpload, gateway).await;

        conversation
            .upload_video(UploadKind::Main, VideoUpload::new("notes.txt", b"text".to_vec()))
            .await;
        assert_eq!(conversation.state().await, ConversationState::AwaitingUpload);
        let events = drain(&mut rx);
        assert_eq!(user_texts(&events), vec!["Uploading notes.txt (0.00 MB)...".to_string()]);
        assert_eq!(assistant_texts(&events), vec![UPLOAD_FAILED.to_string()]);

        conversation
            .upload_video(UploadKind::Main, VideoUpload::new("raw.mp4", vec![0; 1024]))
            .await;
        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::AwaitingTemplate);
        assert_eq!(session.main_video_ref.as_deref(), Some("uploads/main/raw.mp4"));
        assert_eq!(
            user_texts(&drain(&mut rx)),
            vec![
                "Uploading raw.mp4 (0.00 MB)...".to_string(),
                "raw.mp4 uploaded successfully!".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_instructions_start_processing_without_gateway() {
        let gateway = Arc::new(ScriptedGateway::default());
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingInstructions, gateway.clone()).await;

        conversation.handle_user_input("make it punchy").await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::Processing);
        assert_eq!(session.instructions.as_deref(), Some("make it punchy"));
        assert_eq!(gateway.calls(), 0);

        let events = drain(&mut rx);
        assert_eq!(
            assistant_texts(&events),
            vec![instructions_acknowledgement("make it punchy")]
        );
        assert!(events.iter().any(|e| matches!(e, UiEvent::ProcessingView { percent: 0, .. })));
    }

    #[tokio::test]
    async fn test_instructions_without_a_view_stay_awaiting() {
        let (presenter, rx) = ChannelPresenter::channel();
        drop(rx);
        let mut conversation = Conversation::new(
            Arc::new(ScriptedGateway::default()),
            Arc::new(presenter),
            SimulatorConfig::default(),
        );
        conversation.session.lock().await.transition(ConversationState::AwaitingInstructions);

        conversation.handle_user_input("make it punchy").await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::AwaitingInstructions);
        assert_eq!(session.instructions.as_deref(), Some("make it punchy"));
        assert!(!conversation.simulator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gary_vee_to_first_progress_tick() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingTemplate, Arc::new(ScriptedGateway::default())).await;

        conversation.handle_user_input("I want to use the Gary Vee style").await;
        let session = conversation.snapshot().await;
        assert_eq!(session.selected_template, Some(Template::GaryVee));
        assert_eq!(session.state, ConversationState::AwaitingInstructions);
        let events = drain(&mut rx);
        let replies = assistant_texts(&events);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Gary Vee"));

        conversation.handle_user_input("add fast cuts").await;
        assert_eq!(conversation.state().await, ConversationState::Processing);
        let events = drain(&mut rx);
        assert!(assistant_texts(&events)[0].contains("\"add fast cuts\""));

        tokio::time::sleep(Duration::from_millis(850)).await;
        let first_progress = drain(&mut rx).into_iter().find_map(|e| match e {
            UiEvent::Progress { percent, .. } => Some(percent),
            _ => None,
        });
        assert_eq!(first_progress, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_finishes_conversation() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingInstructions, Arc::new(ScriptedGateway::default())).await;

        conversation.handle_user_input("captions everywhere").await;
        tokio::time::sleep(Duration::from_secs(12)).await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::Finished);
        assert_eq!(session.last_assistant_message().unwrap().text, RESULT_MESSAGE);
        assert!(assistant_texts(&drain(&mut rx)).contains(&RESULT_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_busy_while_processing() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::Processing, Arc::new(ScriptedGateway::default())).await;

        conversation.select_template(Template::AlexHormozi).await;
        conversation
            .handle_upload_result(UploadKind::Main, UploadOutcome::stored("uploads/main/b.mp4", "b.mp4"))
            .await;

        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::Processing);
        assert!(session.selected_template.is_none());
        assert!(session.main_video_ref.is_none());
        assert_eq!(
            assistant_texts(&drain(&mut rx)),
            vec![BUSY_MESSAGE.to_string(), BUSY_MESSAGE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_gateway_reply_adopts_state_and_renders_affordance() {
        let gateway = Arc::new(ScriptedGateway::replying(vec![Ok(ChatResponse::reply(
            "Perfect! Please upload your video.".to_string(),
            "awaiting_upload",
        ))]));
        let (mut conversation, mut rx) = new_conversation(gateway.clone());

        conversation.handle_user_input("let's go").await;

        assert_eq!(conversation.state().await, ConversationState::AwaitingUpload);
        let events = drain(&mut rx);
        assert_eq!(
            assistant_texts(&events),
            vec!["Perfect! Please upload your video.".to_string()]
        );
        assert!(events.contains(&UiEvent::UploadAffordance { kind: UploadKind::Main }));
        // history excludes the message being sent
        assert!(gateway.last_history.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_reply_with_unknown_or_reserved_state_keeps_state() {
        let gateway = Arc::new(ScriptedGateway::replying(vec![
            Ok(ChatResponse::reply("Happy to chat!".to_string(), "chatting")),
            Ok(ChatResponse::reply("Done already!".to_string(), "finished")),
        ]));
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingUpload, gateway).await;

        conversation.handle_user_input("how are you").await;
        conversation.handle_user_input("are we done").await;

        assert_eq!(conversation.state().await, ConversationState::AwaitingUpload);
        assert_eq!(
            assistant_texts(&drain(&mut rx)),
            vec!["Happy to chat!".to_string(), "Done already!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stale_gateway_state_is_discarded() {
        let gateway = Arc::new(ScriptedGateway::replying(vec![Ok(ChatResponse::reply(
            "Let's pick a template.".to_string(),
            "awaiting_template",
        ))]));
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingUpload, gateway.clone()).await;
        *gateway.interfere.lock().unwrap() =
            Some((conversation.session(), ConversationState::AwaitingInstructions));

        conversation.handle_user_input("what now").await;

        assert_eq!(conversation.state().await, ConversationState::AwaitingInstructions);
        let events = drain(&mut rx);
        assert_eq!(assistant_texts(&events), vec!["Let's pick a template.".to_string()]);
        assert!(!catalog_rendered(&events));
    }

    #[tokio::test]
    async fn test_gateway_failure_falls_back_to_welcome_intents() {
        let failing = || Err(GatewayError::Rejected("HTTP 500".to_string()));

        let (mut conversation, mut rx) = new_conversation(Arc::new(ScriptedGateway::replying(vec![failing()])));
        conversation.handle_user_input("I have a video to upload").await;
        assert_eq!(conversation.state().await, ConversationState::AwaitingUpload);
        let events = drain(&mut rx);
        assert_eq!(assistant_texts(&events), vec![UPLOAD_PROMPT.to_string()]);
        assert!(events.contains(&UiEvent::UploadAffordance { kind: UploadKind::Main }));

        let (mut conversation, mut rx) = new_conversation(Arc::new(ScriptedGateway::replying(vec![failing()])));
        conversation.handle_user_input("show me a style").await;
        assert_eq!(conversation.state().await, ConversationState::AwaitingTemplate);
        let events = drain(&mut rx);
        assert_eq!(assistant_texts(&events), vec![TEMPLATE_PROMPT.to_string()]);
        assert!(catalog_rendered(&events));

        let (mut conversation, mut rx) = new_conversation(Arc::new(ScriptedGateway::replying(vec![failing()])));
        conversation.handle_user_input("hello there").await;
        assert_eq!(conversation.state().await, ConversationState::Welcome);
        assert_eq!(assistant_texts(&drain(&mut rx)), vec![WELCOME_FALLBACK.to_string()]);
    }

    #[tokio::test]
    async fn test_declined_reply_outside_welcome_uses_continue_prompt() {
        let gateway = Arc::new(ScriptedGateway::replying(vec![Ok(ChatResponse::failure("quota"))]));
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingUpload, gateway).await;

        conversation.handle_user_input("upload is slow").await;

        assert_eq!(conversation.state().await, ConversationState::AwaitingUpload);
        assert_eq!(assistant_texts(&drain(&mut rx)), vec![CONTINUE_FALLBACK.to_string()]);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let gateway = Arc::new(ScriptedGateway::default());
        let (mut conversation, mut rx) = new_conversation(gateway.clone());

        conversation.handle_user_input("   \n").await;

        assert!(drain(&mut rx).is_empty());
        assert!(conversation.snapshot().await.message_log.is_empty());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_transition_posts_one_assistant_message() {
        let (mut conversation, mut rx) = new_conversation(Arc::new(ScriptedGateway::default()));

        conversation.start_upload().await;
        assert_eq!(assistant_texts(&drain(&mut rx)).len(), 1);
        conversation
            .handle_upload_result(UploadKind::Main, UploadOutcome::stored("uploads/main/a.mp4", "a.mp4"))
            .await;
        assert_eq!(assistant_texts(&drain(&mut rx)).len(), 1);
        conversation.handle_user_input("iman").await;
        assert_eq!(assistant_texts(&drain(&mut rx)).len(), 1);
        conversation.handle_user_input("subtitles").await;
        assert_eq!(assistant_texts(&drain(&mut rx)).len(), 1);

        conversation.show_help().await;
        assert_eq!(assistant_texts(&drain(&mut rx)), vec![HELP_TEXT.to_string()]);
        assert_eq!(conversation.state().await, ConversationState::Processing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_processing_and_resets_session() {
        let (mut conversation, mut rx) =
            conversation_in(ConversationState::AwaitingInstructions, Arc::new(ScriptedGateway::default())).await;

        conversation.handle_user_input("fast cuts").await;
        tokio::time::sleep(Duration::from_millis(1700)).await;
        conversation.restart().await;
        drain(&mut rx);

        tokio::time::sleep(Duration::from_secs(12)).await;
        let session = conversation.snapshot().await;
        assert_eq!(session.state, ConversationState::Welcome);
        assert!(session.message_log.is_empty());
        assert!(drain(&mut rx).is_empty());
    }
}
