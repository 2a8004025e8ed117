use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{SearchOptions, SearchResponse};

/// Capability interface for web-search providers.
///
/// Implementations must tolerate missing credentials by returning an empty
/// result list rather than erroring, so the pipeline degrades confidence
/// instead of aborting a run.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name used in logs and source attribution.
    fn name(&self) -> &'static str;

    /// Executes one search query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on network failure, a non-success provider
    /// status, or a malformed response body. Callers treat these as soft
    /// failures for individual queries.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError>;
}
