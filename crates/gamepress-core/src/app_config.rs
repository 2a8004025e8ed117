#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Application configuration, loaded from the environment.
///
/// Provider API keys are optional: a missing key disables that provider and
/// the pipeline degrades (empty search results, lowered confidence) instead
/// of refusing to start.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,

    /// Tavily search API key. `None` disables live search.
    pub search_api_key: Option<String>,
    pub search_base_url: String,
    pub search_timeout_secs: u64,
    /// Default result count per query when a slot does not override it.
    pub search_max_results: usize,

    /// LLM provider API key. `None` disables generation (useful for dry runs).
    pub llm_api_key: Option<String>,
    /// OpenAI-compatible chat-completions base URL.
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_retry_backoff_base_ms: u64,

    /// Top-N research results handed to the Specialist per section query.
    pub section_top_results: usize,
    /// Character budget applied to each result's content in section prompts.
    pub section_result_char_budget: usize,
    /// Bounded revision attempts after validation/review failures.
    pub max_revision_attempts: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("search_base_url", &self.search_base_url)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("search_max_results", &self.search_max_results)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_retries", &self.llm_max_retries)
            .field(
                "llm_retry_backoff_base_ms",
                &self.llm_retry_backoff_base_ms,
            )
            .field("section_top_results", &self.section_top_results)
            .field(
                "section_result_char_budget",
                &self.section_result_char_budget,
            )
            .field("max_revision_attempts", &self.max_revision_attempts)
            .finish()
    }
}
