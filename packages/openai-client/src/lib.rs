//! OpenAI chat completions client.
//!
//! Covers plain chat completions and strict structured output. Structured
//! replies are typed: derive `JsonSchema + Deserialize` and call `extract`.
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct Verdict { label: String }
//!
//! let client = OpenAIClient::new(api_key)?;
//! let verdict: Verdict = client.extract("gpt-4o-mini", system, user).await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::StructuredOutput;
pub use types::*;

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::ChatResponseRaw;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAIError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let raw = self.post_chat(&request).await?;
        let usage = raw.usage.clone();
        let content = first_content(raw)?;
        Ok(ChatResponse { content, usage })
    }

    /// Raw JSON text of a strict structured reply.
    pub async fn structured_output(&self, request: StructuredRequest) -> Result<String> {
        let raw = self.post_chat(&request).await?;
        first_content(raw)
    }

    /// Ask for a `T`, with the schema derived from the type.
    pub async fn extract<T: StructuredOutput>(
        &self,
        model: &str,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let request = StructuredRequest::new(
            model,
            T::type_name(),
            system_prompt,
            user_prompt,
            T::strict_schema(),
        );
        let json = self.structured_output(request).await?;

        serde_json::from_str(&json).map_err(|e| {
            OpenAIError::Parse(format!("reply is not a valid {}: {}", T::type_name(), e))
        })
    }

    async fn post_chat<B: Serialize>(&self, body: &B) -> Result<ChatResponseRaw> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %message, "OpenAI API error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw = response
            .json::<ChatResponseRaw>()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        debug!(duration_ms = start.elapsed().as_millis(), "OpenAI chat completion");
        Ok(raw)
    }
}

fn first_content(raw: ChatResponseRaw) -> Result<String> {
    let message = raw
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| OpenAIError::EmptyReply("no choices".to_string()))?;

    match (message.content, message.refusal) {
        (Some(content), _) => Ok(content),
        (None, Some(refusal)) => Err(OpenAIError::EmptyReply(format!("refused: {}", refusal))),
        (None, None) => Err(OpenAIError::EmptyReply("no content".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> ChatResponseRaw {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = OpenAIClient::new("sk-test")
            .unwrap()
            .with_base_url("http://127.0.0.1:4000/v1/");
        assert_eq!(client.base_url(), "http://127.0.0.1:4000/v1");
    }

    #[test]
    fn first_content_takes_the_first_choice() {
        let content = first_content(raw(
            r#"{"choices":[{"message":{"content":"a"}},{"message":{"content":"b"}}]}"#,
        ))
        .unwrap();
        assert_eq!(content, "a");
    }

    #[test]
    fn refusals_and_empty_replies_are_errors() {
        let refused = first_content(raw(
            r#"{"choices":[{"message":{"content":null,"refusal":"cannot help"}}]}"#,
        ));
        assert!(matches!(refused, Err(OpenAIError::EmptyReply(m)) if m.contains("cannot help")));

        let empty = first_content(raw(r#"{"choices":[]}"#));
        assert!(matches!(empty, Err(OpenAIError::EmptyReply(_))));
    }
}
