//! Search-provider capability for the article pipeline.
//!
//! Exposes the [`SearchProvider`] trait consumed by the pipeline plus the
//! Tavily HTTP client implementation. A client built without credentials
//! stays usable: every query returns an empty result set so the pipeline can
//! degrade confidence instead of aborting.

pub mod error;
pub mod provider;
pub mod tavily;
pub mod types;

pub use error::SearchError;
pub use provider::SearchProvider;
pub use tavily::TavilyClient;
pub use types::{SearchDepth, SearchOptions, SearchResponse, SearchResultItem};
