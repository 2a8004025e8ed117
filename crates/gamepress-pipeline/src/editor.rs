//! Editor stage: turns the Scout's briefing into a validated article plan.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use gamepress_core::{ArticleCategory, GameArticleContext};
use gamepress_llm::{generate_structured, LlmError, StructuredGenerator, TokenUsage};

use crate::error::{PipelineError, Stage};
use crate::strategy::CategoryStrategy;
use crate::types::{ArticlePlan, ArticleSectionPlan, Briefing, SafetyFlags};

const MAX_SECTIONS: usize = 8;

/// Shape of the Editor's plan response before validation.
#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    goal: String,
    #[serde(default)]
    research_queries: Vec<String>,
    #[serde(default)]
    must_cover: Vec<String>,
}

/// Runs the Editor: one planning call, and on an unusable plan exactly one
/// corrective retry that names the defect. A plan still unusable after the
/// retry aborts the run.
pub async fn run_editor(
    llm: &dyn StructuredGenerator,
    strategy: &CategoryStrategy,
    ctx: &GameArticleContext,
    briefing: &Briefing,
    cancel: &CancellationToken,
    usage: &mut TokenUsage,
) -> Result<ArticlePlan, PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled(Stage::Planning));
    }

    let mut suggestions = strategy.suggested_must_cover(ctx);
    let hinted_category = strategy.intent.category();
    if let Some(hint) = ctx.category_hints.get(&hinted_category) {
        suggestions.push(hint.clone());
    }

    let user = crate::prompts::editor_plan_user(
        ctx,
        &briefing.full_context,
        &suggestions,
        hinted_category.as_slug(),
    );

    let defect = match plan_attempt(llm, &user, ctx, usage).await {
        Ok(Ok(plan)) => return Ok(plan),
        Ok(Err(defect)) => defect,
        Err(err) => return Err(PipelineError::Stage {
            stage: Stage::Planning,
            source: err,
        }),
    };

    warn!(defect = %defect, "plan rejected, issuing corrective retry");
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled(Stage::Planning));
    }

    let retry_user = crate::prompts::editor_retry_user(&user, &defect);
    match plan_attempt(llm, &retry_user, ctx, usage).await {
        Ok(Ok(plan)) => Ok(plan),
        Ok(Err(defect)) => Err(PipelineError::PlanInvalid(defect)),
        Err(err) => Err(PipelineError::Stage {
            stage: Stage::Planning,
            source: err,
        }),
    }
}

/// One planning call. The outer `Result` is a hard LLM failure; the inner
/// one distinguishes a usable plan from a named defect worth a retry.
/// Malformed JSON is a defect, not a hard failure.
async fn plan_attempt(
    llm: &dyn StructuredGenerator,
    user: &str,
    ctx: &GameArticleContext,
    usage: &mut TokenUsage,
) -> Result<Result<ArticlePlan, String>, LlmError> {
    match generate_structured::<RawPlan>(llm, crate::prompts::EDITOR_SYSTEM, user).await {
        Ok((raw, call_usage)) => {
            usage.absorb(call_usage);
            Ok(validate_plan(raw, ctx))
        }
        Err(LlmError::Schema { source, .. }) => {
            Ok(Err(format!("response was not valid plan JSON: {source}")))
        }
        Err(err) => Err(err),
    }
}

/// Converts a raw plan into the validated form, or names the defect.
fn validate_plan(raw: RawPlan, ctx: &GameArticleContext) -> Result<ArticlePlan, String> {
    if raw.title.trim().is_empty() {
        return Err("plan has no title".to_string());
    }
    if raw.sections.is_empty() {
        return Err("plan has zero sections".to_string());
    }
    if raw.sections.len() > MAX_SECTIONS {
        return Err(format!(
            "plan has {} sections, maximum is {MAX_SECTIONS}",
            raw.sections.len()
        ));
    }

    let category = match ArticleCategory::parse_slug(&raw.category) {
        Some(category) => category,
        None => {
            warn!(
                category = %raw.category,
                "unrecognized plan category, defaulting to guides"
            );
            ArticleCategory::Guides
        }
    };

    let mut sections = Vec::with_capacity(raw.sections.len());
    for raw_section in raw.sections {
        let headline = raw_section.headline.trim().to_string();
        if headline.is_empty() {
            return Err("plan has a section with an empty headline".to_string());
        }
        let mut research_queries: Vec<String> = raw_section
            .research_queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        if research_queries.is_empty() {
            // Planner omitted queries; derive one so the Specialist always
            // has research to pull.
            research_queries.push(format!("{} {}", ctx.game_name, headline));
        }
        sections.push(ArticleSectionPlan {
            headline,
            goal: raw_section.goal.trim().to_string(),
            research_queries,
            must_cover: raw_section.must_cover,
        });
    }

    let tags: Vec<String> = raw
        .tags
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(ArticlePlan {
        title: raw.title.trim().to_string(),
        excerpt: raw.excerpt.trim().to_string(),
        category,
        tags,
        sections,
        safety: SafetyFlags {
            no_scores_unless_review: category != ArticleCategory::Reviews,
        },
    })
}
