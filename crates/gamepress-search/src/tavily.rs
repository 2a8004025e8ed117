//! HTTP client for the Tavily search API.
//!
//! Wraps `reqwest` with Tavily-specific request shaping and typed response
//! deserialization. A client constructed without an API key is "disabled":
//! every search returns an empty result set so callers can degrade instead
//! of special-casing missing credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::{SearchOptions, SearchResponse, SearchResultItem};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Client for the Tavily search API.
///
/// Use [`TavilyClient::new`] for production or [`TavilyClient::with_base_url`]
/// to point at a mock server in tests.
pub struct TavilyClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_domains: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f32,
}

impl TavilyClient {
    /// Creates a new client pointed at the production Tavily API.
    ///
    /// Pass `None` for `api_key` to build a disabled client that returns
    /// empty result sets.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gamepress/0.1 (article-research)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| SearchError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        if api_key.is_none() {
            tracing::warn!("TAVILY_API_KEY not set, search disabled: all queries return empty");
        }

        Ok(Self {
            client,
            api_key: api_key.map(str::to_owned),
            base_url,
        })
    }

    /// Whether this client holds credentials and will perform live searches.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(query, "search skipped, no credentials");
            return Ok(SearchResponse::default());
        };

        let url = self
            .base_url
            .join("search")
            .map_err(|e| SearchError::ApiError(format!("invalid search endpoint: {e}")))?;

        let request = TavilyRequest {
            api_key,
            query,
            max_results: options.max_results,
            search_depth: options.depth.as_str(),
            include_answer: true,
            include_domains: options.domain_filters.as_deref(),
        };

        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "Tavily returned status {status}: {body}"
            )));
        }

        let body = response.text().await?;
        let parsed: TavilyResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: format!("tavily search(query={query})"),
                source: e,
            })?;

        let results = parsed
            .results
            .into_iter()
            .map(|r| SearchResultItem {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
            })
            .collect();
        let answer = parsed.answer.filter(|a| !a.trim().is_empty());

        Ok(SearchResponse { results, answer })
    }
}
