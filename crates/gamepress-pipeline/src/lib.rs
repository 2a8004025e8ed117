//! Multi-stage article generation for gaming-wiki content.
//!
//! A run flows Scout (research fan-out) → Editor (structured plan) →
//! Specialists (one per section) → Reviewer (advisory), with a shared
//! research pool underneath so no query is ever executed twice and every
//! claim can be traced back to a recorded source.

pub mod editor;
pub mod error;
pub mod intent;
pub mod markdown;
pub mod pipeline;
pub mod pool;
pub mod prompts;
pub mod reviewer;
pub mod scout;
pub mod specialist;
pub mod strategy;
pub mod tasks;
pub mod types;
pub mod validate;

pub use error::{PipelineError, Stage};
pub use intent::detect_article_intent;
pub use pipeline::generate_game_article_draft;
pub use pool::{normalize_query, normalize_url, ResearchCategory, ResearchPool};
pub use strategy::StrategyRegistry;
pub use types::{
    ArticlePlan, ArticleSectionPlan, Briefing, Confidence, DraftSection, GameArticleDraft,
    GenerationOptions, GenerationPhase, ProgressCallback, SafetyFlags, ScoutOutput, Severity,
    SourcePhase, SourceUsageItem, ValidationIssue,
};
