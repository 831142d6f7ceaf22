//! Pulls the tagged segments out of a raw model response.

use regex::Regex;
use std::sync::OnceLock;

use crate::core::error::ExtractionError;

fn thinking_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<thinking>(.*?)</thinking>").unwrap())
}

fn output_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<output>(.*?)</output>").unwrap())
}

/// Returns the trimmed interior of the first `<thinking>` span, if any.
pub fn extract_thinking(content: &str) -> Option<String> {
    thinking_re()
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
}

/// Returns the trimmed interior of the first `<output>` span.
pub fn extract_output(content: &str) -> Result<String, ExtractionError> {
    output_re()
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .ok_or(ExtractionError)
}
