//! Loads runner and client settings from TOML.
//!
//! ```toml
//! model = "gpt-4o-mini"
//! prompt = "Write an email to <name> about <topic>"
//! max_tokens = 1024
//! include_reasoning = true
//! log_level = "info"
//!
//! [vars]
//! name = "Bob"
//! topic = "lemons"
//!
//! [client]
//! backend = "openai"
//! api_key_env = "OPENAI_API_KEY"
//! ```

use llm::builder::LLMBackend;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

use crate::api::{AnthropicClient, CompletionClient, OpenAIClient, PromptRunnerBuilder};
use crate::core::error::InputError;
use crate::core::render::Variables;

/// Connection settings for one of the supported providers.
#[derive(Deserialize, Debug, Clone)]
pub struct ClientConfig {
    pub backend: String,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl ClientConfig {
    /// Builds the adapter for the configured backend.
    ///
    /// Fails for backends the `llm` crate does not know, for known backends
    /// outside the supported set, and when the API key variable is unset.
    /// `base_url` only applies to OpenAI; the Anthropic endpoint is fixed.
    pub fn build(&self) -> Result<Box<dyn CompletionClient>, InputError> {
        let backend = LLMBackend::from_str(&self.backend)
            .map_err(|_| InputError::UnsupportedClient(self.backend.clone()))?;

        let default_env = match backend {
            LLMBackend::OpenAI => "OPENAI_API_KEY",
            LLMBackend::Anthropic => "ANTHROPIC_API_KEY",
            _ => return Err(InputError::UnsupportedClient(self.backend.clone())),
        };
        let api_key_env = self.api_key_env.as_deref().unwrap_or(default_env);
        let api_key =
            env::var(api_key_env).map_err(|_| InputError::MissingApiKey(api_key_env.to_string()))?;

        let client: Box<dyn CompletionClient> = match backend {
            LLMBackend::Anthropic => {
                if self.base_url.is_some() {
                    return Err(InputError::BaseUrlUnsupported(self.backend.clone()));
                }
                let mut c = AnthropicClient::new(api_key);
                if let Some(t) = self.timeout_seconds {
                    c = c.timeout_seconds(t);
                }
                Box::new(c)
            }
            _ => {
                let mut c = OpenAIClient::new(api_key);
                if let Some(url) = &self.base_url {
                    c = c.base_url(url);
                }
                if let Some(t) = self.timeout_seconds {
                    c = c.timeout_seconds(t);
                }
                Box::new(c)
            }
        };
        Ok(client)
    }
}

fn default_include_reasoning() -> bool {
    true
}

/// A complete run description.
#[derive(Deserialize, Debug, Clone)]
pub struct RunnerConfig {
    pub model: String,
    pub prompt: String,
    pub max_tokens: i64,
    #[serde(default = "default_include_reasoning")]
    pub include_reasoning: bool,
    pub log_level: Option<String>,
    #[serde(default)]
    pub vars: toml::Table,
    pub client: ClientConfig,
}

impl RunnerConfig {
    /// Parses a run description from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, InputError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML run description from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Template variables in file order. Strings are used verbatim, other values in TOML form.
    pub fn variables(&self) -> Variables {
        self.vars
            .iter()
            .map(|(k, v)| match v {
                toml::Value::String(s) => (k.clone(), s.clone()),
                other => (k.clone(), other.to_string()),
            })
            .collect()
    }

    /// A builder pre-filled from this config. Call `build` to validate it.
    pub fn runner<'a>(
        &self,
        client: &'a dyn CompletionClient,
    ) -> Result<PromptRunnerBuilder<'a>, InputError> {
        let mut builder = PromptRunnerBuilder::new()
            .client(client)
            .model(&self.model)
            .prompt(&self.prompt)
            .vars(self.variables())
            .max_tokens(self.max_tokens)
            .include_reasoning(self.include_reasoning);
        if let Some(level) = &self.log_level {
            let level =
                Level::from_str(level).map_err(|_| InputError::LogLevel(level.clone()))?;
            builder = builder.log_level(level);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
model = "gpt-4o-mini"
prompt = "Write an email to <name> about <topic>"
max_tokens = 256
log_level = "debug"

[vars]
name = "Bob"
topic = "lemons"
count = 3

[client]
backend = "openai"
api_key_env = "LIMEPROMPT_TEST_OPENAI_KEY"
"#;

    #[test]
    fn test_parse_runner_config() {
        let config = RunnerConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 256);
        assert!(config.include_reasoning);
        let vars: Vec<_> = config
            .variables()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            vars,
            vec![
                ("name".to_string(), "Bob".to_string()),
                ("topic".to_string(), "lemons".to_string()),
                ("count".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = RunnerConfig::load(file.path()).unwrap();
        assert_eq!(config.client.backend, "openai");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunnerConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let config = ClientConfig {
            backend: "carrier-pigeon".to_string(),
            api_key_env: None,
            base_url: None,
            timeout_seconds: None,
        };
        assert!(matches!(
            config.build(),
            Err(InputError::UnsupportedClient(name)) if name == "carrier-pigeon"
        ));
    }

    #[test]
    fn test_known_but_unsupported_backend_is_rejected() {
        let config = ClientConfig {
            backend: "ollama".to_string(),
            api_key_env: None,
            base_url: None,
            timeout_seconds: None,
        };
        assert!(matches!(
            config.build(),
            Err(InputError::UnsupportedClient(_))
        ));
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = ClientConfig {
            backend: "anthropic".to_string(),
            api_key_env: Some("LIMEPROMPT_TEST_UNSET_KEY".to_string()),
            base_url: None,
            timeout_seconds: None,
        };
        assert!(matches!(
            config.build(),
            Err(InputError::MissingApiKey(var)) if var == "LIMEPROMPT_TEST_UNSET_KEY"
        ));
    }

    #[test]
    fn test_anthropic_rejects_base_url() {
        std::env::set_var("LIMEPROMPT_TEST_ANTHROPIC_KEY", "k");
        let config = ClientConfig {
            backend: "anthropic".to_string(),
            api_key_env: Some("LIMEPROMPT_TEST_ANTHROPIC_KEY".to_string()),
            base_url: Some("http://localhost:9000".to_string()),
            timeout_seconds: None,
        };
        assert!(matches!(
            config.build(),
            Err(InputError::BaseUrlUnsupported(name)) if name == "anthropic"
        ));
    }

    #[test]
    fn test_openai_client_from_config() {
        std::env::set_var("LIMEPROMPT_TEST_OPENAI_KEY", "k");
        let config = ClientConfig {
            backend: "openai".to_string(),
            api_key_env: Some("LIMEPROMPT_TEST_OPENAI_KEY".to_string()),
            base_url: Some("http://localhost:9000/v1".to_string()),
            timeout_seconds: Some(3),
        };
        assert_eq!(config.build().unwrap().provider(), "openai");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = RunnerConfig::from_toml_str(SAMPLE).unwrap();
        config.log_level = Some("chatty".to_string());
        let client = crate::api::OpenAIClient::new("k");
        assert!(matches!(
            config.runner(&client),
            Err(InputError::LogLevel(_))
        ));
    }

    #[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
    #[allow(dead_code)]
    struct Email {
        subject: String,
        message: String,
    }

    #[test]
    fn test_runner_from_config_renders_variables() {
        let config = RunnerConfig::from_toml_str(SAMPLE).unwrap();
        let client = crate::api::OpenAIClient::new("k");
        let runner = config.runner(&client).unwrap().build::<Email>().unwrap();

        assert_eq!(runner.model(), "gpt-4o-mini");
        assert_eq!(runner.max_tokens(), 256);
        let rendered = runner.rendered_prompt();
        assert!(rendered.contains("<prompt>\nWrite an email to <name> about <topic>\n</prompt>"));
        assert!(rendered.contains(
            "<variables>\n<name>\nBob\n</name>\n<topic>\nlemons\n</topic>\n<count>\n3\n</count>\n</variables>"
        ));
    }
}
