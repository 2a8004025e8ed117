//! Article generation entry point: Scout → Editor → Specialists → Reviewer,
//! with deterministic validation and a bounded revision loop.

use tracing::{debug, info, warn};

use gamepress_core::{AppConfig, GameArticleContext};
use gamepress_llm::{StructuredGenerator, TokenUsage};
use gamepress_search::SearchProvider;

use crate::editor::run_editor;
use crate::error::{PipelineError, Stage};
use crate::intent::detect_article_intent;
use crate::markdown::assemble_draft;
use crate::reviewer::run_reviewer;
use crate::scout::run_scout;
use crate::specialist::{run_specialist_section, section_summary};
use crate::strategy::StrategyRegistry;
use crate::tasks::BackgroundTasks;
use crate::types::{
    DraftSection, GameArticleDraft, GenerationOptions, GenerationPhase, Severity, ValidationIssue,
};
use crate::validate::{has_errors, validate_draft};

/// Generates one article draft end to end.
///
/// Failure policy: single search queries, individual sections, and the
/// Reviewer degrade softly into [`ValidationIssue`]s on the draft; scouting
/// cancellation, an unusable plan, and a run where no section could be
/// written abort with a [`PipelineError`].
pub async fn generate_game_article_draft(
    search: &dyn SearchProvider,
    llm: &dyn StructuredGenerator,
    config: &AppConfig,
    ctx: &GameArticleContext,
    options: &GenerationOptions,
) -> Result<GameArticleDraft, PipelineError> {
    let mut tasks = BackgroundTasks::new();
    let mut usage = TokenUsage::default();
    let cancel = &options.cancel;

    let intent = detect_article_intent(ctx.instruction.as_deref());
    let registry = StrategyRegistry::new();
    let scout_strategy = registry.get(intent);
    info!(game = %ctx.game_name, intent = ?intent, "starting article generation");

    tasks.notify(options.progress.as_ref(), GenerationPhase::Scouting);
    let scout = run_scout(search, llm, scout_strategy, config, ctx, cancel).await?;
    usage.absorb(scout.usage);
    debug!(
        sources = scout.pool.total_distinct_sources(),
        confidence = scout.confidence.as_str(),
        "scouting complete"
    );

    tasks.notify(options.progress.as_ref(), GenerationPhase::Planning);
    let plan = run_editor(llm, scout_strategy, ctx, &scout.briefing, cancel, &mut usage).await?;
    info!(
        title = %plan.title,
        category = plan.category.as_slug(),
        sections = plan.sections.len(),
        "plan accepted"
    );

    let write_strategy = registry.for_category(plan.category);
    let mut pool = scout.pool;

    // First writing pass. Failed sections are skipped, not fatal.
    let mut sections: Vec<DraftSection> = Vec::with_capacity(plan.sections.len());
    let mut failed_issues: Vec<ValidationIssue> = Vec::new();
    let mut prior_summaries: Vec<String> = Vec::new();
    for idx in 0..plan.sections.len() {
        if cancel.is_cancelled() {
            tasks.drain().await;
            return Err(PipelineError::Cancelled(Stage::Writing));
        }
        tasks.notify(options.progress.as_ref(), GenerationPhase::Writing(idx));
        match run_specialist_section(
            search,
            llm,
            &mut pool,
            ctx,
            &plan,
            idx,
            &prior_summaries,
            write_strategy,
            config,
            &[],
            &mut usage,
        )
        .await
        {
            Ok(section) => {
                prior_summaries.push(section_summary(&section));
                sections.push(section);
            }
            Err(err) => {
                warn!(headline = %plan.sections[idx].headline, error = %err, "section failed");
                failed_issues.push(ValidationIssue::error(
                    format!("section could not be generated: {err}"),
                    Some(format!("section \"{}\"", plan.sections[idx].headline)),
                ));
            }
        }
    }

    if sections.is_empty() {
        tasks.drain().await;
        return Err(PipelineError::NoSections);
    }

    let mut markdown = assemble_draft(&sections);
    let mut det_issues = validate_draft(&plan, &sections, &markdown);

    if cancel.is_cancelled() {
        tasks.drain().await;
        return Err(PipelineError::Cancelled(Stage::Reviewing));
    }
    tasks.notify(options.progress.as_ref(), GenerationPhase::Reviewing);
    let review_issues =
        run_reviewer(llm, &plan, &markdown, &scout.briefing.full_context, &mut usage).await;

    // Bounded revision loop. Only deterministic checks re-run after a
    // rewrite; the Reviewer's findings stand as recorded.
    let max_attempts = options
        .max_revision_attempts
        .unwrap_or(config.max_revision_attempts);
    let mut attempt = 0u32;
    while attempt < max_attempts {
        if !has_errors(&det_issues) && !has_errors(&review_issues) {
            break;
        }
        let targets = revision_targets(&sections, &det_issues, &review_issues);
        if targets.iter().all(|notes| notes.is_empty()) {
            debug!("remaining errors name no section, stopping revisions");
            break;
        }

        attempt += 1;
        info!(attempt, max_attempts, "revising sections with errors");
        for (pos, notes) in targets.iter().enumerate() {
            if notes.is_empty() {
                continue;
            }
            if cancel.is_cancelled() {
                tasks.drain().await;
                return Err(PipelineError::Cancelled(Stage::Writing));
            }
            let plan_idx = plan
                .sections
                .iter()
                .position(|s| s.headline == sections[pos].headline)
                .unwrap_or(pos);
            tasks.notify(options.progress.as_ref(), GenerationPhase::Writing(plan_idx));
            // A rewrite must only see summaries of sections written before
            // it, never its own first-pass summary or later sections.
            match run_specialist_section(
                search,
                llm,
                &mut pool,
                ctx,
                &plan,
                plan_idx,
                &prior_summaries[..pos],
                write_strategy,
                config,
                notes,
                &mut usage,
            )
            .await
            {
                Ok(rewritten) => {
                    prior_summaries[pos] = section_summary(&rewritten);
                    sections[pos] = rewritten;
                }
                Err(err) => {
                    warn!(
                        headline = %sections[pos].headline,
                        error = %err,
                        "revision attempt failed, keeping previous version"
                    );
                }
            }
        }

        markdown = assemble_draft(&sections);
        det_issues = validate_draft(&plan, &sections, &markdown);
    }

    let mut issues = det_issues;
    issues.extend(failed_issues);
    issues.extend(review_issues);

    let failed_callbacks = tasks.drain().await;
    if failed_callbacks > 0 {
        debug!(failed_callbacks, "some progress callbacks failed");
    }

    let source_urls = pool.source_urls().to_vec();
    let discarded_images = sections.iter().map(|s| s.discarded_images).sum();
    info!(
        sections = sections.len(),
        issues = issues.len(),
        tokens = usage.total(),
        "article generation complete"
    );

    Ok(GameArticleDraft {
        title: plan.title,
        excerpt: plan.excerpt,
        category: plan.category,
        tags: plan.tags,
        sections,
        markdown,
        source_urls,
        issues,
        discarded_images,
        usage,
        confidence: scout.confidence,
    })
}

/// Per-written-section revision notes: the messages of every error-severity
/// issue whose location names that section.
fn revision_targets(
    sections: &[DraftSection],
    det_issues: &[ValidationIssue],
    review_issues: &[ValidationIssue],
) -> Vec<Vec<String>> {
    sections
        .iter()
        .map(|section| {
            let location = format!("section \"{}\"", section.headline);
            det_issues
                .iter()
                .chain(review_issues)
                .filter(|issue| {
                    issue.severity == Severity::Error
                        && issue.location.as_deref() == Some(location.as_str())
                })
                .map(|issue| issue.message.clone())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(headline: &str) -> DraftSection {
        DraftSection {
            headline: headline.to_string(),
            markdown: "Body.".to_string(),
            source_usage: Vec::new(),
            discarded_images: 0,
        }
    }

    #[test]
    fn revision_targets_route_errors_to_their_section() {
        let sections = vec![section("A"), section("B")];
        let det = vec![ValidationIssue::error(
            "placeholder text left in draft",
            Some("section \"B\"".to_string()),
        )];
        let review = vec![ValidationIssue::warning(
            "tone drifts",
            Some("section \"A\"".to_string()),
        )];
        let targets = revision_targets(&sections, &det, &review);
        assert!(targets[0].is_empty());
        assert_eq!(targets[1], ["placeholder text left in draft"]);
    }

    #[test]
    fn revision_targets_ignore_unlocated_errors() {
        let sections = vec![section("A")];
        let det = vec![ValidationIssue::error("global problem", None)];
        let targets = revision_targets(&sections, &det, &[]);
        assert!(targets[0].is_empty());
    }
}
