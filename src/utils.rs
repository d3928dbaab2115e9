// utils.rs - Small shared helpers

use std::path::Path;

/// One row of an ordered keyword table: any keyword hit yields `outcome`
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T> {
    pub keywords: &'static [&'static str],
    pub outcome: T,
}

impl<T> KeywordRule<T> {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

/// Case-insensitive substring match. First matching rule wins, so table order is part of its meaning.
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &str) -> Option<T> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.outcome)
}

/// Strip any directory components a client put in an uploaded file name
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn video_mime_type(name: &str) -> &'static str {
    match file_extension(name).as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}
