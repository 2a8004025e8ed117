//! Structured-LLM capability for the article pipeline.
//!
//! Exposes the [`StructuredGenerator`] trait consumed by the pipeline plus an
//! OpenAI-compatible chat-completions client with per-call timeout, transient
//! retry with back-off, and token-usage accounting. Schema-shaped responses
//! are requested in JSON mode and deserialized by the typed
//! [`generate_structured`] helper.

pub mod client;
pub mod error;
pub mod provider;
pub mod retry;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use provider::{generate_structured, Completion, JsonCompletion, StructuredGenerator};
pub use types::TokenUsage;
