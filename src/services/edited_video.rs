// src/services/edited_video.rs
//! Style slug → pre-edited showcase video, backing `/api/process/`

use crate::conversation::templates::Template;
use crate::models::file::ProcessResponse;

const CUSTOM_UNAVAILABLE: &str =
    "🚧 Custom video editing is temporarily unavailable due to high API demand. Try Alex, Iman, or Gary styles!";

pub fn video_path(template: Template) -> Option<&'static str> {
    match template {
        Template::AlexHormozi => Some("/static/videos/alex_edited.mp4"),
        Template::ImanGadzhi => Some("/static/videos/iman_edited.mp4"),
        Template::GaryVee => Some("/static/videos/gary_edited.mp4"),
        Template::Custom => None,
    }
}

/// `style` is a template slug such as `gary_vee`. `public_base` is the scheme and host
/// prefixed to the static path, e.g. `https://zuckky.app`
pub fn process_style(style: &str, public_base: &str) -> ProcessResponse {
    let Some(template) = Template::from_style_slug(style) else {
        return ProcessResponse {
            success: false,
            edited_video_url: None,
            message: "Invalid style selected".to_string(),
        };
    };

    match video_path(template) {
        Some(path) => ProcessResponse {
            success: true,
            edited_video_url: Some(format!("{}{}", public_base.trim_end_matches('/'), path)),
            message: format!("✅ Video successfully edited in {} style!", template),
        },
        None => ProcessResponse {
            success: false,
            edited_video_url: None,
            message: CUSTOM_UNAVAILABLE.to_string(),
        },
    }
}
