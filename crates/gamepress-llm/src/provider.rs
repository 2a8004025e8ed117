use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::types::TokenUsage;

/// A plain-text completion plus the tokens it cost.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// A JSON-mode completion plus the tokens it cost.
#[derive(Debug, Clone)]
pub struct JsonCompletion {
    pub value: serde_json::Value,
    pub usage: TokenUsage,
}

/// Capability interface for structured LLM generation.
///
/// Kept object-safe (no generic methods) so pipeline stages can hold a
/// `&dyn StructuredGenerator` and tests can inject mocks. Typed
/// deserialization is layered on top via [`generate_structured`].
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Generates free-form prose.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on network failure, provider error, or an empty
    /// completion.
    async fn generate_text(&self, system: &str, user: &str) -> Result<Completion, LlmError>;

    /// Generates a completion in JSON mode and parses it into a
    /// `serde_json::Value`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Schema`] if the completion is not valid JSON, in
    /// addition to the failure modes of [`Self::generate_text`].
    async fn generate_json(&self, system: &str, user: &str) -> Result<JsonCompletion, LlmError>;
}

/// Generates a completion and deserializes it into `T`.
///
/// # Errors
///
/// Returns [`LlmError::Schema`] with the target type name as context when the
/// model's JSON does not match `T`. Callers are expected to retry once with a
/// corrective follow-up prompt before promoting the failure to hard.
pub async fn generate_structured<T: DeserializeOwned>(
    generator: &dyn StructuredGenerator,
    system: &str,
    user: &str,
) -> Result<(T, TokenUsage), LlmError> {
    let completion = generator.generate_json(system, user).await?;
    let parsed: T = serde_json::from_value(completion.value).map_err(|e| LlmError::Schema {
        context: std::any::type_name::<T>().to_string(),
        source: e,
    })?;
    Ok((parsed, completion.usage))
}
