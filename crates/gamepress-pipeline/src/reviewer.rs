//! Reviewer stage: holistic LLM review of the assembled draft.
//!
//! Review is advisory. A failed review call never fails the run; it
//! surfaces as a warning on the draft instead.

use serde::Deserialize;
use tracing::warn;

use gamepress_llm::{generate_structured, StructuredGenerator, TokenUsage};

use crate::prompts::{reviewer_user, REVIEWER_SYSTEM};
use crate::types::{ArticlePlan, ValidationIssue};

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(default)]
    severity: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    location: Option<String>,
}

/// Reviews the assembled draft against its plan. Returns the reviewer's
/// findings, or a single warning when review is unavailable.
pub async fn run_reviewer(
    llm: &dyn StructuredGenerator,
    plan: &ArticlePlan,
    markdown: &str,
    research_context: &str,
    usage: &mut TokenUsage,
) -> Vec<ValidationIssue> {
    let user = reviewer_user(plan, markdown, research_context);
    match generate_structured::<RawReview>(llm, REVIEWER_SYSTEM, &user).await {
        Ok((review, call_usage)) => {
            usage.absorb(call_usage);
            review
                .issues
                .into_iter()
                .filter(|issue| !issue.message.trim().is_empty())
                .map(convert_issue)
                .collect()
        }
        Err(err) => {
            warn!(error = %err, "review unavailable, continuing without it");
            vec![ValidationIssue::warning(
                format!("editorial review unavailable: {err}"),
                None,
            )]
        }
    }
}

/// Unrecognized severities downgrade to warnings; an advisory stage should
/// not invent blocking errors from malformed output.
fn convert_issue(raw: RawIssue) -> ValidationIssue {
    if raw.severity.eq_ignore_ascii_case("error") {
        ValidationIssue::error(raw.message, raw.location)
    } else {
        ValidationIssue::warning(raw.message, raw.location)
    }
}
