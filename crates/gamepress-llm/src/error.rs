use thiserror::Error;

/// Errors returned by the LLM client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error status or an empty/unusable completion.
    #[error("LLM API error: {0}")]
    ApiError(String),

    /// No API key was configured; generation cannot run at all.
    #[error("LLM credentials missing")]
    MissingCredentials,

    /// The completion text could not be parsed into the expected JSON shape.
    /// Callers retry once with a corrective follow-up prompt before giving up.
    #[error("schema validation failed for {context}: {source}")]
    Schema {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
