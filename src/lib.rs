//! Limeprompt sends a templated instruction to a language model, asks for a
//! `<thinking>` trace and a JSON answer inside `<output>` tags, and validates
//! that answer against a typed output model.
//!
//! ```rust,no_run
//! use limeprompt::{OpenAIClient, PromptRunnerBuilder};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct Email {
//!     subject: String,
//!     message: String,
//! }
//!
//! # async fn demo() -> Result<(), limeprompt::Error> {
//! let client = OpenAIClient::new(std::env::var("OPENAI_API_KEY").unwrap_or_default());
//! let runner = PromptRunnerBuilder::new()
//!     .client(&client)
//!     .model("gpt-4o-mini")
//!     .prompt("Write an email to <name> about <topic>")
//!     .vars([("name", "Bob"), ("topic", "lemons")])
//!     .max_tokens(1024)
//!     .build::<Email>()?;
//!
//! let result = runner.run().await?;
//! println!("{}", result.output.subject);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod core;

pub use api::{
    AnthropicClient, ClientError, CompletionClient, Error, FailureKind, InputError, OpenAIClient,
    PromptRunner, PromptRunnerBuilder, RunError, RunOutput,
};
pub use crate::core::config::{ClientConfig, RunnerConfig};
pub use crate::core::render::Variables;
pub use crate::core::schema::OutputSchema;
