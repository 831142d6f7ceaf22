//! High-level fluent API for running a prompt and validating its structured answer.

mod error;
mod llm_bridge;
mod runner;

pub use error::{
    ClientError, DecodeError, Error, ExtractionError, FailureKind, FieldIssue, InputError,
    OutputError, RunError, RunFailure, SchemaViolation,
};
pub use llm_bridge::{AnthropicClient, CompletionClient, OpenAIClient};
pub use runner::{PromptRunner, PromptRunnerBuilder};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput<T> {
    /// The validated output model.
    pub output: T,
    /// The `<thinking>` trace, when reasoning was requested and the model produced one.
    pub reasoning: Option<String>,
}

impl<T> RunOutput<T> {
    /// Splits the result into the output and the optional reasoning.
    pub fn into_parts(self) -> (T, Option<String>) {
        (self.output, self.reasoning)
    }
}
