use serde::{Deserialize, Serialize};

/// A single search hit. Immutable once produced by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    /// Extracted page content or snippet.
    pub content: String,
    /// Provider relevance score in `[0.0, 1.0]`.
    pub score: f32,
}

/// Provider-side search depth. `Advanced` costs more provider credits and
/// returns richer content extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl SearchDepth {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// Everything a provider returns for one query: the ranked hits plus the
/// provider's own short answer synthesized over them, when it offers one.
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub answer: Option<String>,
}

/// Per-query execution parameters.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: usize,
    pub depth: SearchDepth,
    /// Restrict results to these domains when set.
    pub domain_filters: Option<Vec<String>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            depth: SearchDepth::Basic,
            domain_filters: None,
        }
    }
}
