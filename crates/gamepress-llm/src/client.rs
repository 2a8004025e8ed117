//! OpenAI-compatible chat-completions client.
//!
//! Wraps `reqwest` with provider-specific error handling, JSON response mode,
//! transient retry (see [`crate::retry`]), and token-usage extraction. All
//! endpoints surface application-level errors as [`LlmError::ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::LlmError;
use crate::provider::{Completion, JsonCompletion, StructuredGenerator};
use crate::retry::retry_with_backoff;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Use [`LlmClient::new`] for production or [`LlmClient::with_base_url`] to
/// point at a mock server in tests.
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl LlmClient {
    /// Creates a new client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, LlmError> {
        Self::with_base_url(
            api_key,
            model,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LlmError::ApiError`] if `base_url` is not a valid
    /// URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gamepress/0.1 (article-generation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| LlmError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.map(str::to_owned),
            model: model.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Sends one chat request and extracts the first choice plus usage.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredentials)?;

        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| LlmError::ApiError(format!("invalid completions endpoint: {e}")))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(api_key)
                .json(&request)
                .send()
                .await?;
            let response = response.error_for_status()?;
            let body = response.text().await?;
            serde_json::from_str::<ChatResponse>(&body).map_err(|e| LlmError::Schema {
                context: "chat completions envelope".to_string(),
                source: e,
            })
        })
        .await?;

        let usage = response
            .usage
            .as_ref()
            .map(TokenUsage::from)
            .unwrap_or_default();

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::ApiError("empty completion".to_string()));
        }

        Ok(Completion { text, usage })
    }
}

#[async_trait]
impl StructuredGenerator for LlmClient {
    async fn generate_text(&self, system: &str, user: &str) -> Result<Completion, LlmError> {
        self.complete(system, user, false).await
    }

    async fn generate_json(&self, system: &str, user: &str) -> Result<JsonCompletion, LlmError> {
        let completion = self.complete(system, user, true).await?;
        let stripped = strip_code_fences(&completion.text);
        let value: serde_json::Value =
            serde_json::from_str(stripped).map_err(|e| LlmError::Schema {
                context: "json completion body".to_string(),
                source: e,
            })?;
        Ok(JsonCompletion {
            value,
            usage: completion.usage,
        })
    }
}

/// Strips a surrounding markdown code fence from a completion.
///
/// Some models wrap JSON-mode output in ```` ```json ```` fences despite the
/// response format; tolerate that rather than failing schema validation.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
