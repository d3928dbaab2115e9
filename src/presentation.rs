// src/presentation.rs
//! Rendering contract between the conversation core and whatever draws the transcript.
//! The core only calls these methods; it never reaches into presentation internals.

use crate::conversation::templates::Template;
use crate::models::file::UploadKind;
use crate::processing::stages::{ProcessingStage, StageVisual};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("render target is gone")]
    Detached,
}

pub trait Presenter: Send + Sync {
    fn append_assistant_message(&self, text: &str);
    fn append_user_message(&self, text: &str);
    fn render_upload_affordance(&self, kind: UploadKind);
    fn render_template_catalog(&self, templates: &[Template]);
    /// Draws every stage as pending with the bar at 0%
    fn render_processing_view(
        &self,
        stages: &[ProcessingStage],
    ) -> Result<Box<dyn ProcessingView>, ViewError>;
    /// Clear the transcript after a restart
    fn reset_transcript(&self) {}
}

/// Handle to one rendered progress widget
pub trait ProcessingView: Send {
    fn update_stage(&mut self, index: usize, visual: StageVisual) -> Result<(), ViewError>;
    fn update_progress(&mut self, percent: u8, status: &str) -> Result<(), ViewError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateCard {
    pub template: Template,
    pub title: &'static str,
    pub description: &'static str,
}

impl From<Template> for TemplateCard {
    fn from(template: Template) -> Self {
        Self {
            template,
            title: template.card_title(),
            description: template.description(),
        }
    }
}

/// Everything the UI is asked to draw, in order. Sent to browsers as JSON frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    AssistantMessage { text: String },
    UserMessage { text: String },
    UploadAffordance { kind: UploadKind },
    TemplateCatalog { templates: Vec<TemplateCard> },
    ProcessingView { stages: Vec<String>, percent: u8 },
    StageUpdate { index: usize, visual: StageVisual },
    Progress { percent: u8, status: String },
    Reset,
}

/// Presenter that forwards events into a channel; a dropped receiver means the view is gone
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelPresenter {
    pub fn new(tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn emit(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("UI channel closed, dropping event");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn append_assistant_message(&self, text: &str) {
        self.emit(UiEvent::AssistantMessage { text: text.to_string() });
    }

    fn append_user_message(&self, text: &str) {
        self.emit(UiEvent::UserMessage { text: text.to_string() });
    }

    fn render_upload_affordance(&self, kind: UploadKind) {
        self.emit(UiEvent::UploadAffordance { kind });
    }

    fn render_template_catalog(&self, templates: &[Template]) {
        self.emit(UiEvent::TemplateCatalog {
            templates: templates.iter().copied().map(TemplateCard::from).collect(),
        });
    }

    fn render_processing_view(
        &self,
        stages: &[ProcessingStage],
    ) -> Result<Box<dyn ProcessingView>, ViewError> {
        self.tx
            .send(UiEvent::ProcessingView {
                stages: stages.iter().map(|s| s.label.to_string()).collect(),
                percent: 0,
            })
            .map_err(|_| ViewError::Detached)?;

        Ok(Box::new(ChannelProcessingView { tx: self.tx.clone() }))
    }

    fn reset_transcript(&self) {
        self.emit(UiEvent::Reset);
    }
}

struct ChannelProcessingView {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ProcessingView for ChannelProcessingView {
    fn update_stage(&mut self, index: usize, visual: StageVisual) -> Result<(), ViewError> {
        self.tx
            .send(UiEvent::StageUpdate { index, visual })
            .map_err(|_| ViewError::Detached)
    }

    fn update_progress(&mut self, percent: u8, status: &str) -> Result<(), ViewError> {
        self.tx
            .send(UiEvent::Progress {
                percent,
                status: status.to_string(),
            })
            .map_err(|_| ViewError::Detached)
    }
}
