//! Fluent builder and runner for a single structured-output round trip.

use std::marker::PhantomData;
use tracing::{debug, error, info, Level};

use super::{
    error::{InputError, RunError, RunFailure},
    llm_bridge::CompletionClient,
    RunOutput,
};
use crate::core::extract::{extract_output, extract_thinking};
use crate::core::render::{render_prompt, Variables};
use crate::core::schema::{parse_output, OutputSchema};

/// A fluent builder to configure a [`PromptRunner`].
///
/// Nothing is checked until [`build`](Self::build), which validates every
/// setting before any request can be made.
pub struct PromptRunnerBuilder<'a> {
    client: Option<&'a dyn CompletionClient>,
    model: Option<String>,
    prompt: Option<String>,
    vars: Variables,
    max_tokens: Option<i64>,
    include_reasoning: bool,
    log_level: Option<Level>,
}

impl Default for PromptRunnerBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PromptRunnerBuilder<'a> {
    /// A builder with reasoning enabled and nothing else set.
    pub fn new() -> Self {
        Self {
            client: None,
            model: None,
            prompt: None,
            vars: Variables::new(),
            max_tokens: None,
            include_reasoning: true,
            log_level: None,
        }
    }

    /// Sets the model client. The caller keeps ownership.
    pub fn client(mut self, client: &'a dyn CompletionClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the provider-specific model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the prompt template.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Sets the variables rendered alongside the prompt, in iteration order.
    pub fn vars(
        mut self,
        vars: impl IntoIterator<Item = (impl Into<String>, impl ToString)>,
    ) -> Self {
        self.vars = vars.into_iter().collect();
        self
    }

    /// Adds or replaces a single variable.
    pub fn var(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.vars.insert(name, value);
        self
    }

    /// Default response length cap, in provider tokens. Must be positive.
    pub fn max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether the model is asked for a `<thinking>` trace. Defaults to `true`.
    pub fn include_reasoning(mut self, include: bool) -> Self {
        self.include_reasoning = include;
        self
    }

    /// Most verbose level this runner emits events at.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Validates the configuration and builds a runner producing `T`.
    pub fn build<T: OutputSchema>(self) -> Result<PromptRunner<'a, T>, InputError> {
        let client = self.client.ok_or(InputError::MissingClient)?;
        let model = self
            .model
            .filter(|m| !m.is_empty())
            .ok_or(InputError::Missing("model_name"))?;
        let prompt = self
            .prompt
            .filter(|p| !p.is_empty())
            .ok_or(InputError::Missing("prompt"))?;
        let requested = self.max_tokens.ok_or(InputError::InvalidMaxTokens(0))?;
        let max_tokens = u32::try_from(requested)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(InputError::InvalidMaxTokens(requested))?;
        let field_names = T::field_names()?;

        Ok(PromptRunner {
            client,
            model,
            prompt,
            vars: self.vars,
            field_names,
            max_tokens,
            include_reasoning: self.include_reasoning,
            log_level: self.log_level,
            _output: PhantomData,
        })
    }
}

/// Renders a prompt, sends it, and validates the tagged JSON answer into `T`.
///
/// Configuration is fixed at build time. Each `run` is an independent attempt,
/// so a runner can be reused and shared across tasks.
pub struct PromptRunner<'a, T> {
    client: &'a dyn CompletionClient,
    model: String,
    prompt: String,
    vars: Variables,
    field_names: Vec<String>,
    max_tokens: u32,
    include_reasoning: bool,
    log_level: Option<Level>,
    _output: PhantomData<fn() -> T>,
}

impl<'a, T: OutputSchema> PromptRunner<'a, T> {
    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The token budget used by [`run`](Self::run).
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Whether the rendered prompt asks for a `<thinking>` trace.
    pub fn include_reasoning(&self) -> bool {
        self.include_reasoning
    }

    /// The exact text sent to the model.
    pub fn rendered_prompt(&self) -> String {
        render_prompt(
            &self.prompt,
            &self.vars,
            &self.field_names,
            self.include_reasoning,
        )
    }

    /// Runs with the configured token budget.
    pub async fn run(&self) -> Result<RunOutput<T>, RunError> {
        self.execute(self.max_tokens).await
    }

    /// Runs once with a different token budget. `0` keeps the configured one.
    pub async fn run_with_max_tokens(&self, max_tokens: u32) -> Result<RunOutput<T>, RunError> {
        let budget = if max_tokens == 0 {
            self.max_tokens
        } else {
            max_tokens
        };
        self.execute(budget).await
    }

    async fn execute(&self, max_tokens: u32) -> Result<RunOutput<T>, RunError> {
        match self.try_execute(max_tokens).await {
            Ok(out) => {
                if self.emits(Level::INFO) {
                    info!(model = %self.model, "Successfully generated and validated output");
                }
                Ok(out)
            }
            Err(failure) => {
                let err = RunError::from(failure);
                if self.emits(Level::ERROR) {
                    error!(model = %self.model, kind = ?err.kind(), "{}", err);
                }
                Err(err)
            }
        }
    }

    async fn try_execute(&self, max_tokens: u32) -> Result<RunOutput<T>, RunFailure> {
        let rendered = self.rendered_prompt();

        if self.emits(Level::INFO) {
            info!(
                model = %self.model,
                provider = self.client.provider(),
                max_tokens,
                "Sending request to API"
            );
        }
        let content = self
            .client
            .complete(&self.model, &rendered, max_tokens)
            .await?;
        if self.emits(Level::DEBUG) {
            debug!(
                prompt_len = rendered.len(),
                response_len = content.len(),
                "Received model response"
            );
        }

        let reasoning = if self.include_reasoning {
            extract_thinking(&content)
        } else {
            None
        };
        let json_text = extract_output(&content)?;
        let output = parse_output::<T>(&json_text)?;

        Ok(RunOutput { output, reasoning })
    }

    fn emits(&self, level: Level) -> bool {
        self.log_level.map_or(true, |max| level <= max)
    }
}
