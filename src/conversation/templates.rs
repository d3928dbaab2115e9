// src/conversation/templates.rs
//! Template catalog and the keyword rule tables used to read intent out of free text

use crate::utils::{first_match, KeywordRule};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Viral editing styles offered in the template picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Template {
    #[serde(rename = "Alex Hormozi")]
    AlexHormozi,
    #[serde(rename = "Iman Gadzhi")]
    ImanGadzhi,
    #[serde(rename = "Gary Vee")]
    GaryVee,
    #[serde(rename = "Custom")]
    Custom,
}

impl Template {
    /// Catalog order, as shown in the picker
    pub const CATALOG: [Template; 4] = [
        Template::AlexHormozi,
        Template::ImanGadzhi,
        Template::GaryVee,
        Template::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Template::AlexHormozi => "Alex Hormozi",
            Template::ImanGadzhi => "Iman Gadzhi",
            Template::GaryVee => "Gary Vee",
            Template::Custom => "Custom",
        }
    }

    /// Title shown on the picker card
    pub fn card_title(&self) -> &'static str {
        match self {
            Template::AlexHormozi => "⚡ Alex Hormozi",
            Template::ImanGadzhi => "🎯 Iman Gadzhi",
            Template::GaryVee => "🔥 Gary Vee",
            Template::Custom => "✨ Create Your Own Unique Style",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::AlexHormozi => "Fast cuts, bold captions, high energy.",
            Template::ImanGadzhi => "Cinematic, smooth B-roll integration.",
            Template::GaryVee => "Raw, authentic feel with subtle cuts.",
            Template::Custom => "Train the AI with your reference video.",
        }
    }

    /// Style slug understood by the `/api/process/` endpoint
    pub fn style_slug(&self) -> &'static str {
        match self {
            Template::AlexHormozi => "alex_hormozi",
            Template::ImanGadzhi => "iman_gadzhi",
            Template::GaryVee => "gary_vee",
            Template::Custom => "custom",
        }
    }

    pub fn from_style_slug(slug: &str) -> Option<Template> {
        Template::CATALOG.into_iter().find(|t| t.style_slug() == slug)
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Template::Custom)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const TEMPLATE_RULES: &[KeywordRule<Template>] = &[
    KeywordRule { keywords: &["alex", "hormozi"], outcome: Template::AlexHormozi },
    KeywordRule { keywords: &["iman", "gadzhi"], outcome: Template::ImanGadzhi },
    KeywordRule { keywords: &["gary", "vee"], outcome: Template::GaryVee },
    KeywordRule { keywords: &["custom"], outcome: Template::Custom },
];

/// Resolve free text typed while the template picker is open
pub fn resolve_template(text: &str) -> Option<Template> {
    first_match(TEMPLATE_RULES, text)
}

/// What a user at the welcome screen most likely wants when the backend is unreachable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeIntent {
    StartUpload,
    BrowseTemplates,
}

pub const WELCOME_INTENT_RULES: &[KeywordRule<WelcomeIntent>] = &[
    KeywordRule { keywords: &["upload", "video"], outcome: WelcomeIntent::StartUpload },
    KeywordRule { keywords: &["template", "style"], outcome: WelcomeIntent::BrowseTemplates },
];

pub fn classify_welcome_intent(text: &str) -> Option<WelcomeIntent> {
    first_match(WELCOME_INTENT_RULES, text)
}
