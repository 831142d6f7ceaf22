//! Bridge types for interoperability with the `llm` crate.
//!
//! The runner only talks to [`CompletionClient`]. Each supported provider gets
//! its own adapter that turns one `complete` call into a single user-role chat
//! request built through `llm::builder::LLMBuilder`.

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use super::error::ClientError;

/// A model provider able to answer a single prompt.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short provider name, used in logs.
    fn provider(&self) -> &str;

    /// Sends `prompt` as one user message and returns the first completion's text verbatim.
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ClientError>;
}

/// Transport settings shared by the provider adapters.
#[derive(Debug, Clone)]
struct Transport {
    api_key: String,
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

impl Transport {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout_seconds: None,
        }
    }

    async fn chat(
        &self,
        backend: LLMBackend,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ClientError> {
        let mut builder = LLMBuilder::new()
            .backend(backend)
            .api_key(&self.api_key)
            .model(model)
            .max_tokens(max_tokens);
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(timeout) = self.timeout_seconds {
            builder = builder.timeout_seconds(timeout);
        }
        let llm = builder.build()?;

        let req = ChatMessage::user().content(prompt).build();
        let resp = llm.chat(&[req]).await?;
        resp.text().ok_or(ClientError::EmptyResponse)
    }
}

macro_rules! provider_client {
    ($(#[$meta:meta])* $name:ident, $backend:expr, $provider:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            transport: Transport,
        }

        impl $name {
            /// A client authenticating with `api_key`.
            pub fn new(api_key: impl Into<String>) -> Self {
                Self {
                    transport: Transport::new(api_key),
                }
            }

            /// Request timeout applied by the underlying HTTP client.
            pub fn timeout_seconds(mut self, seconds: u64) -> Self {
                self.transport.timeout_seconds = Some(seconds);
                self
            }
        }

        #[async_trait]
        impl CompletionClient for $name {
            fn provider(&self) -> &str {
                $provider
            }

            async fn complete(
                &self,
                model: &str,
                prompt: &str,
                max_tokens: u32,
            ) -> Result<String, ClientError> {
                self.transport
                    .chat($backend, model, prompt, max_tokens)
                    .await
            }
        }
    };
}

provider_client!(
    /// Anthropic Messages API client.
    AnthropicClient,
    LLMBackend::Anthropic,
    "anthropic"
);

provider_client!(
    /// OpenAI client, sent through the Responses API.
    OpenAIClient,
    LLMBackend::OpenAI,
    "openai"
);

impl OpenAIClient {
    /// Points the client at a compatible endpoint instead of `https://api.openai.com/v1`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.transport.base_url = Some(base_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_with(text: &str) -> Value {
        json!({
            "id": "resp_1",
            "object": "response",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": text}]
            }]
        })
    }

    async fn openai_server(body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new("test-key")
            .base_url(format!("{}/v1", server.uri()))
            .timeout_seconds(5)
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(AnthropicClient::new("k").provider(), "anthropic");
        assert_eq!(OpenAIClient::new("k").provider(), "openai");
    }

    #[test]
    fn test_transport_settings() {
        let client = OpenAIClient::new("k")
            .base_url("http://localhost:8080/v1/")
            .timeout_seconds(5);
        assert_eq!(
            client.transport.base_url.as_deref(),
            Some("http://localhost:8080/v1/")
        );
        assert_eq!(client.transport.timeout_seconds, Some(5));
    }

    #[tokio::test]
    async fn test_complete_sends_one_user_message_with_budget() {
        let server = openai_server(reply_with("<output>{}</output>")).await;
        let client = client_for(&server);

        client
            .complete("gpt-test", "Write <name>", 64)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["max_output_tokens"], 64);
        let input = body["input"].as_array().unwrap();
        assert_eq!(input.len(), 1);
        assert_eq!(input[0]["role"], "user");
        assert_eq!(input[0]["content"][0]["text"], "Write <name>");
    }

    #[tokio::test]
    async fn test_complete_returns_text_untrimmed() {
        let text = "  <thinking>hm</thinking>\n<output>{\"a\": 1}</output>\n";
        let server = openai_server(reply_with(text)).await;

        let content = client_for(&server).complete("m", "p", 10).await.unwrap();
        assert_eq!(content, text);
    }

    #[tokio::test]
    async fn test_reply_without_text_is_empty_response() {
        let server = openai_server(json!({"id": "resp_1", "output": []})).await;

        let err = client_for(&server).complete("m", "p", 10).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_http_error_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("m", "p", 10).await.unwrap_err();
        assert!(matches!(err, ClientError::LLM(_)));
    }
}
