//! In-memory research aggregation for one generation run.
//!
//! The pool deduplicates search results by normalized query and normalized
//! URL, caches executed queries so no query hits the network twice within a
//! run, and ranks results for prompt building. It is owned exclusively by one
//! generation run and discarded at run end, never shared or persisted.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use gamepress_search::SearchResultItem;

/// Category tag for an executed research query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchCategory {
    Overview,
    CategorySpecific,
    Tips,
    Recent,
    Meta,
    SectionSpecific,
}

impl ResearchCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResearchCategory::Overview => "overview",
            ResearchCategory::CategorySpecific => "category-specific",
            ResearchCategory::Tips => "tips",
            ResearchCategory::Recent => "recent",
            ResearchCategory::Meta => "meta",
            ResearchCategory::SectionSpecific => "section-specific",
        }
    }
}

/// Weight of provider relevance vs. content quality in the combined score
/// used by [`ResearchPool::top_sources_per_query`].
const RELEVANCE_WEIGHT: f32 = 0.6;
const QUALITY_WEIGHT: f32 = 0.4;

/// A search hit plus the independent 0–100 quality and relevance scores
/// assigned when it entered the pool.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    pub item: SearchResultItem,
    /// Deterministic content-quality heuristic, 0–100.
    pub quality: f32,
    /// Provider relevance scaled to 0–100.
    pub relevance: f32,
}

impl ScoredResult {
    /// Weighted sum used to pick "best evidence" per query:
    /// `0.6 * relevance + 0.4 * quality`.
    #[must_use]
    pub fn combined(&self) -> f32 {
        RELEVANCE_WEIGHT * self.relevance + QUALITY_WEIGHT * self.quality
    }
}

/// One executed query and everything it returned.
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedSearchResult {
    /// The query as issued.
    pub query: String,
    /// Normalized form used for caching and matching.
    pub normalized_query: String,
    pub category: ResearchCategory,
    pub results: Vec<ScoredResult>,
    /// Optional short answer/summary attached by the search step.
    pub answer: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Deduplicating research store for one generation run.
#[derive(Debug, Default)]
pub struct ResearchPool {
    entries: Vec<CategorizedSearchResult>,
    /// Normalized query → index into `entries`. Consulted before any
    /// external search call.
    query_index: HashMap<String, usize>,
    /// Every normalized URL seen this run.
    all_urls: HashSet<String>,
    /// Normalized URLs in first-seen order, for the dedup source list.
    url_order: Vec<String>,
}

/// Normalizes a query for cache keys: trim, lowercase, collapse whitespace.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a URL for dedup: lowercase scheme/host/path, strip query
/// string and fragment, drop a trailing slash.
///
/// Falls back to a lowercased, query-stripped form of the raw string when
/// the input does not parse as a URL.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    if let Ok(mut url) = url::Url::parse(raw.trim()) {
        url.set_query(None);
        url.set_fragment(None);
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let path = url.path().to_lowercase();
        let path = path.trim_end_matches('/');
        format!("{}://{}{}", url.scheme(), host, path)
    } else {
        let stripped = raw
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        stripped.to_lowercase()
    }
}

/// Deterministic content-quality heuristic, 0–100.
///
/// Longer extracted content scores higher (up to 70 points at ~1750 chars);
/// a non-empty title and an https URL add 15 points each.
fn quality_score(item: &SearchResultItem) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let length_points = (item.content.chars().count() as f32 / 25.0).min(70.0);
    let title_points = if item.title.trim().is_empty() { 0.0 } else { 15.0 };
    let https_points = if item.url.starts_with("https://") {
        15.0
    } else {
        0.0
    };
    (length_points + title_points + https_points).clamp(0.0, 100.0)
}

impl ResearchPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously executed query by its normalized form.
    /// Callers consult this before issuing any external search call.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<&CategorizedSearchResult> {
        self.query_index
            .get(&normalize_query(query))
            .map(|&idx| &self.entries[idx])
    }

    /// Records one executed query and its results.
    ///
    /// Idempotent: when the normalized query is already cached the existing
    /// entry is returned unchanged and no new work happens. New URLs are
    /// added to the distinct-source set; URLs already seen stay in the result
    /// list (needed for attribution) but are not double-counted.
    pub fn record_result(
        &mut self,
        query: &str,
        category: ResearchCategory,
        results: Vec<SearchResultItem>,
        answer: Option<String>,
    ) -> &CategorizedSearchResult {
        let normalized_query = normalize_query(query);
        if let Some(&idx) = self.query_index.get(&normalized_query) {
            return &self.entries[idx];
        }

        let scored = results
            .into_iter()
            .map(|item| {
                let normalized_url = normalize_url(&item.url);
                if self.all_urls.insert(normalized_url.clone()) {
                    self.url_order.push(normalized_url);
                }
                ScoredResult {
                    quality: quality_score(&item),
                    relevance: (item.score.clamp(0.0, 1.0)) * 100.0,
                    item,
                }
            })
            .collect();

        let entry = CategorizedSearchResult {
            query: query.to_string(),
            normalized_query: normalized_query.clone(),
            category,
            results: scored,
            answer,
            fetched_at: Utc::now(),
        };
        self.entries.push(entry);
        let idx = self.entries.len() - 1;
        self.query_index.insert(normalized_query, idx);
        &self.entries[idx]
    }

    /// Returns stored findings whose normalized query matches any of the
    /// given queries, exactly or by prefix in either direction.
    ///
    /// Used by the Specialist to pull only the research relevant to one
    /// section without re-querying.
    #[must_use]
    pub fn extract_for_queries(&self, queries: &[String]) -> Vec<&CategorizedSearchResult> {
        let normalized: Vec<String> = queries.iter().map(|q| normalize_query(q)).collect();
        self.entries
            .iter()
            .filter(|entry| {
                normalized.iter().any(|q| {
                    !q.is_empty()
                        && (entry.normalized_query.starts_with(q.as_str())
                            || q.starts_with(&entry.normalized_query))
                })
            })
            .collect()
    }

    /// For each distinct query, the single result with the highest combined
    /// quality+relevance score. Used to build a "best evidence" prompt block
    /// without flooding context.
    #[must_use]
    pub fn top_sources_per_query(&self) -> Vec<(&str, &ScoredResult)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .results
                    .iter()
                    .max_by(|a, b| {
                        a.combined()
                            .partial_cmp(&b.combined())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|best| (entry.query.as_str(), best))
            })
            .collect()
    }

    /// Findings for one category, in insertion order.
    pub fn findings_for(
        &self,
        category: ResearchCategory,
    ) -> impl Iterator<Item = &CategorizedSearchResult> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// All executed queries, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &CategorizedSearchResult> {
        self.entries.iter()
    }

    /// Count of distinct normalized source URLs seen this run.
    #[must_use]
    pub fn total_distinct_sources(&self) -> usize {
        self.all_urls.len()
    }

    /// Whether this normalized URL was seen during research.
    #[must_use]
    pub fn has_url(&self, normalized_url: &str) -> bool {
        self.all_urls.contains(normalized_url)
    }

    /// Normalized source URLs in first-seen order.
    #[must_use]
    pub fn source_urls(&self) -> &[String] {
        &self.url_order
    }
}
