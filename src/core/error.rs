//! Errors produced by the pipeline stages and by runner configuration.

use std::fmt;
use thiserror::Error;

/// Errors raised while validating a runner's configuration.
///
/// These surface synchronously from [`PromptRunnerBuilder::build`](crate::PromptRunnerBuilder::build)
/// and from the config loaders, before any request leaves the process.
#[derive(Error, Debug)]
pub enum InputError {
    /// No model client was supplied.
    #[error("model_client must be provided")]
    MissingClient,

    /// A required string setting was not supplied or is empty.
    #[error("{0} must be a non-empty string")]
    Missing(&'static str),

    /// The token budget is zero, negative or too large.
    #[error("max_tokens must be a positive integer, got {0}")]
    InvalidMaxTokens(i64),

    /// The output type does not describe a JSON object with named fields.
    #[error("output model '{0}' must describe a JSON object with named fields")]
    UnsupportedSchema(String),

    /// The configured backend is unknown or not one of the supported providers.
    #[error("model_client backend '{0}' is not supported (expected 'anthropic' or 'openai')")]
    UnsupportedClient(String),

    /// The backend has no configurable endpoint.
    #[error("base_url is not supported for backend '{0}'")]
    BaseUrlUnsupported(String),

    /// The configured log level could not be parsed.
    #[error("Invalid log level '{0}'")]
    LogLevel(String),

    /// An environment variable holding an API key is not set.
    #[error("Environment variable '{0}' not set")]
    MissingApiKey(String),

    /// Failed to read a configuration file.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a configuration file.
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The mandatory `<output>` span is missing from the model response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unable to extract output from API response")]
pub struct ExtractionError;

/// The `<output>` interior is not valid JSON.
#[derive(Error, Debug)]
#[error("{source} (near: {excerpt:?})")]
pub struct DecodeError {
    /// Leading part of the text that failed to decode.
    pub excerpt: String,
    #[source]
    pub source: serde_json::Error,
}

const EXCERPT_CHARS: usize = 120;

impl DecodeError {
    pub(crate) fn new(text: &str, source: serde_json::Error) -> Self {
        let excerpt = match text.char_indices().nth(EXCERPT_CHARS) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        };
        Self { excerpt, source }
    }
}

/// A single reason why decoded JSON does not fit the output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    /// The decoded value is not a JSON object.
    NotAnObject { found: &'static str },
    /// A required field is absent.
    Missing(String),
    /// A field holds a JSON value of the wrong type.
    Mistyped {
        field: String,
        expected: String,
        found: &'static str,
    },
    /// A field is not declared and the schema forbids extra fields.
    Unexpected(String),
    /// Deserialization into the output type failed.
    Invalid(String),
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { found } => write!(f, "expected a JSON object, found {}", found),
            Self::Missing(field) => write!(f, "{}: field required", field),
            Self::Mistyped {
                field,
                expected,
                found,
            } => write!(f, "{}: expected {}, found {}", field, expected, found),
            Self::Unexpected(field) => write!(f, "{}: extra fields not permitted", field),
            Self::Invalid(message) => write!(f, "{}", message),
        }
    }
}

/// Decoded JSON failed validation against the output schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Name of the output type.
    pub schema: String,
    /// Every problem found, in field order.
    pub issues: Vec<FieldIssue>,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error(s) for {}",
            self.issues.len(),
            self.schema
        )?;
        for issue in &self.issues {
            write!(f, "\n  {}", issue)?;
        }
        Ok(())
    }
}

/// Why the `<output>` interior could not become the output type.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Validation(#[from] SchemaViolation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_truncates_excerpt() {
        let text = "x".repeat(500);
        let source = serde_json::from_str::<serde_json::Value>(&text).unwrap_err();
        let err = DecodeError::new(&text, source);
        assert_eq!(err.excerpt.len(), EXCERPT_CHARS + 3);
        assert!(err.excerpt.ends_with("..."));
    }

    #[test]
    fn test_decode_error_keeps_short_text() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DecodeError::new("{", source);
        assert_eq!(err.excerpt, "{");
    }

    #[test]
    fn test_schema_violation_lists_every_issue() {
        let err = SchemaViolation {
            schema: "Email".to_string(),
            issues: vec![
                FieldIssue::Missing("subject".to_string()),
                FieldIssue::Unexpected("cc".to_string()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 validation error(s) for Email"));
        assert!(msg.contains("subject: field required"));
        assert!(msg.contains("cc: extra fields not permitted"));
    }
}
