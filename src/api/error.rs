//! Error types for the library API.

use llm::error::LLMError;
use thiserror::Error;

pub use crate::core::error::{
    DecodeError, ExtractionError, FieldIssue, InputError, OutputError, SchemaViolation,
};

/// Errors surfaced by a [`CompletionClient`](super::CompletionClient).
#[derive(Error, Debug)]
pub enum ClientError {
    /// An error originating from the underlying LLM backend.
    #[error("LLM backend error: {0}")]
    LLM(#[from] LLMError),

    /// The provider answered without any text content.
    #[error("Provider returned no text content")]
    EmptyResponse,

    /// Any other adapter failure.
    #[error("{0}")]
    Custom(String),
}

impl ClientError {
    /// Create a custom client error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// The stage of a run that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Extraction,
    Decode,
    Validation,
}

/// Stage-specific cause carried by a [`RunError`].
#[derive(Error, Debug)]
pub enum RunFailure {
    #[error(transparent)]
    Transport(#[from] ClientError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Validation(#[from] SchemaViolation),
}

impl RunFailure {
    /// The stage this failure belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Extraction(_) => FailureKind::Extraction,
            Self::Decode(_) => FailureKind::Decode,
            Self::Validation(_) => FailureKind::Validation,
        }
    }
}

impl From<OutputError> for RunFailure {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::Decode(e) => Self::Decode(e),
            OutputError::Validation(e) => Self::Validation(e),
        }
    }
}

/// The single error returned by a failed run.
///
/// The message names the failing stage; [`RunError::cause`] and
/// `std::error::Error::source` give access to the stage error itself.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RunError {
    message: String,
    #[source]
    cause: RunFailure,
}

impl RunError {
    /// The stage that failed.
    pub fn kind(&self) -> FailureKind {
        self.cause.kind()
    }

    /// The stage error behind the message.
    pub fn cause(&self) -> &RunFailure {
        &self.cause
    }

    /// Consumes the error and returns the stage error.
    pub fn into_cause(self) -> RunFailure {
        self.cause
    }
}

impl From<RunFailure> for RunError {
    fn from(cause: RunFailure) -> Self {
        let message = match &cause {
            RunFailure::Transport(e) => format!("Model request failed: {}", e),
            RunFailure::Extraction(e) => e.to_string(),
            RunFailure::Decode(e) => format!("Error decoding JSON response: {}", e),
            RunFailure::Validation(e) => format!("Error validating output model: {}", e),
        };
        Self { message, cause }
    }
}

macro_rules! run_error_from {
    ($($stage:ty),+) => {
        $(
            impl From<$stage> for RunError {
                fn from(err: $stage) -> Self {
                    RunFailure::from(err).into()
                }
            }
        )+
    };
}

run_error_from!(ClientError, ExtractionError, DecodeError, SchemaViolation);

/// A comprehensive error type for all operations in the library API.
#[derive(Error, Debug)]
pub enum Error {
    /// The runner could not be configured.
    #[error(transparent)]
    Input(#[from] InputError),

    /// A run failed.
    #[error(transparent)]
    Run(#[from] RunError),
}
