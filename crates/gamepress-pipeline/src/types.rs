//! Data model shared across pipeline stages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use gamepress_core::ArticleCategory;
use gamepress_llm::TokenUsage;

use crate::pool::ResearchPool;

/// Coarse signal of research sufficiency computed by the Scout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Narrative research briefing synthesized by the Scout.
#[derive(Debug, Clone, Serialize)]
pub struct Briefing {
    pub overview: String,
    pub category_insights: String,
    pub recent_developments: String,
    /// All three narratives joined, used as compact research context.
    pub full_context: String,
}

/// Everything the Scout hands to the Editor and Specialists.
#[derive(Debug)]
pub struct ScoutOutput {
    pub briefing: Briefing,
    pub pool: ResearchPool,
    /// Ordered, deduplicated list of every source URL seen during scouting.
    pub source_urls: Vec<String>,
    pub usage: TokenUsage,
    pub confidence: Confidence,
}

/// Category-dependent content rules carried on the plan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SafetyFlags {
    /// When set, numeric review scores ("8/10") in the draft are errors.
    /// Set for every category except `reviews`.
    pub no_scores_unless_review: bool,
}

/// One planned section: what to write and what research backs it.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSectionPlan {
    pub headline: String,
    pub goal: String,
    pub research_queries: Vec<String>,
    pub must_cover: Vec<String>,
}

/// Structured article plan produced by the Editor.
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePlan {
    pub title: String,
    pub excerpt: String,
    pub category: ArticleCategory,
    pub tags: Vec<String>,
    pub sections: Vec<ArticleSectionPlan>,
    pub safety: SafetyFlags,
}

/// Which pipeline phase consulted a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePhase {
    Scouting,
    Writing,
}

/// Attribution record: one source consulted while writing one section.
#[derive(Debug, Clone, Serialize)]
pub struct SourceUsageItem {
    pub url: String,
    pub title: String,
    /// `"text"` for prose sources, `"image"` for embedded media.
    pub content_type: &'static str,
    /// Name of the search provider that surfaced this source.
    pub provider: &'static str,
    /// The research query that surfaced this source.
    pub query: String,
    pub phase: SourcePhase,
    /// Index of the section this source fed.
    pub section: usize,
    /// Whether the generated markdown actually references the URL.
    pub cited: bool,
}

/// One written section of the draft.
#[derive(Debug, Clone, Serialize)]
pub struct DraftSection {
    pub headline: String,
    pub markdown: String,
    pub source_usage: Vec<SourceUsageItem>,
    /// Hallucinated images removed from this section's markdown.
    pub discarded_images: usize,
}

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding, from deterministic checks or the Reviewer.
/// Accumulated on the draft, never silently dropped.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    pub location: Option<String>,
}

impl ValidationIssue {
    #[must_use]
    pub fn error(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }
}

/// Final assembled article draft returned by the entry point.
#[derive(Debug, Serialize)]
pub struct GameArticleDraft {
    pub title: String,
    pub excerpt: String,
    pub category: ArticleCategory,
    pub tags: Vec<String>,
    pub sections: Vec<DraftSection>,
    /// The assembled markdown: `## headline` blocks in plan order.
    pub markdown: String,
    /// Every distinct source URL consulted across scouting and writing,
    /// in first-seen order.
    pub source_urls: Vec<String>,
    /// Outstanding findings after the revision loop. Presence of
    /// warning-severity issues does not mean failure; error-severity issues
    /// mean the bounded revision attempts could not clear them.
    pub issues: Vec<ValidationIssue>,
    pub discarded_images: usize,
    pub usage: TokenUsage,
    pub confidence: Confidence,
}

/// Phase boundary markers for progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Scouting,
    Planning,
    /// Writing the section at this plan index.
    Writing(usize),
    Reviewing,
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationPhase::Scouting => write!(f, "scouting"),
            GenerationPhase::Planning => write!(f, "planning"),
            GenerationPhase::Writing(idx) => write!(f, "writing:{idx}"),
            GenerationPhase::Reviewing => write!(f, "reviewing"),
        }
    }
}

/// Progress callback invoked at phase boundaries. Callback failures are
/// tracked by the background-task layer and never abort generation.
pub type ProgressCallback = Arc<dyn Fn(GenerationPhase) + Send + Sync>;

/// Per-run generation options.
#[derive(Clone, Default)]
pub struct GenerationOptions {
    pub progress: Option<ProgressCallback>,
    /// Cancellation token threaded through every stage.
    pub cancel: CancellationToken,
    /// Overrides the configured revision-attempt bound when set.
    pub max_revision_attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_phase_display_includes_section_index() {
        assert_eq!(GenerationPhase::Writing(2).to_string(), "writing:2");
        assert_eq!(GenerationPhase::Scouting.to_string(), "scouting");
    }

    #[test]
    fn confidence_serializes_lowercase() {
        let json = serde_json::to_string(&Confidence::Low).unwrap();
        assert_eq!(json, "\"low\"");
    }
}
