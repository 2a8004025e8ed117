//! Scout stage: parallel research fan-out, pool population, and briefing
//! synthesis.

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use gamepress_core::{AppConfig, GameArticleContext};
use gamepress_llm::{StructuredGenerator, TokenUsage};
use gamepress_search::SearchProvider;

use crate::error::{PipelineError, Stage};
use crate::markdown::leading_sentences;
use crate::pool::{ResearchCategory, ResearchPool};
use crate::prompts::{scout_bucket_user, SCOUT_SYSTEM};
use crate::strategy::CategoryStrategy;
use crate::types::{Briefing, Confidence, ScoutOutput};

const OVERVIEW_BUCKET: &[ResearchCategory] = &[ResearchCategory::Overview];
const CATEGORY_BUCKET: &[ResearchCategory] =
    &[ResearchCategory::CategorySpecific, ResearchCategory::Tips];
const RECENT_BUCKET: &[ResearchCategory] = &[ResearchCategory::Recent, ResearchCategory::Meta];

/// Runs the Scout: fans out every query slot concurrently, records results
/// into a fresh research pool, computes confidence, and synthesizes the
/// three briefing buckets.
///
/// Individual query failures are logged and treated as empty slots; only
/// cancellation aborts the stage. When a bucket's synthesis call fails, that
/// bucket degrades to a deterministic stitch of its top findings so the
/// pipeline can continue.
pub async fn run_scout(
    search: &dyn SearchProvider,
    llm: &dyn StructuredGenerator,
    strategy: &CategoryStrategy,
    config: &AppConfig,
    ctx: &GameArticleContext,
    cancel: &CancellationToken,
) -> Result<ScoutOutput, PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled(Stage::Scouting));
    }

    let slots = strategy.build_slots(ctx, config.search_max_results);
    let total_slots = slots.len();

    let searches = slots
        .iter()
        .map(|slot| search.search(&slot.query, &slot.options));
    let outcomes = join_all(searches).await;

    let mut pool = ResearchPool::new();
    let mut empty_slots = 0usize;
    let mut overview_hit = false;
    let mut category_hit = false;

    for (slot, outcome) in slots.iter().zip(outcomes) {
        match outcome {
            Ok(response) if !response.results.is_empty() => {
                if slot.category == ResearchCategory::Overview {
                    overview_hit = true;
                }
                if slot.category == ResearchCategory::CategorySpecific {
                    category_hit = true;
                }
                debug!(
                    slot = slot.label,
                    results = response.results.len(),
                    has_answer = response.answer.is_some(),
                    "scout query returned results"
                );
                pool.record_result(&slot.query, slot.category, response.results, response.answer);
            }
            Ok(_) => {
                empty_slots += 1;
                debug!(slot = slot.label, "scout query returned no results");
            }
            Err(err) => {
                empty_slots += 1;
                warn!(slot = slot.label, error = %err, "scout query failed");
            }
        }
    }

    let confidence = assess_confidence(total_slots, empty_slots, overview_hit, category_hit);

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled(Stage::Scouting));
    }

    let mut usage = TokenUsage::default();
    let overview =
        synthesize_bucket(llm, ctx, &pool, "what the game is", OVERVIEW_BUCKET, config, &mut usage)
            .await;
    let category_insights = synthesize_bucket(
        llm,
        ctx,
        &pool,
        "the requested article focus",
        CATEGORY_BUCKET,
        config,
        &mut usage,
    )
    .await;
    let recent_developments = synthesize_bucket(
        llm,
        ctx,
        &pool,
        "recent news, updates, and community reception",
        RECENT_BUCKET,
        config,
        &mut usage,
    )
    .await;

    let briefing = assemble_briefing(overview, category_insights, recent_developments);
    let source_urls = pool.source_urls().to_vec();
    Ok(ScoutOutput {
        briefing,
        pool,
        source_urls,
        usage,
        confidence,
    })
}

/// Synthesizes one briefing bucket. An empty bucket yields an empty string
/// without an LLM call; a failed call degrades to the stitched fallback.
async fn synthesize_bucket(
    llm: &dyn StructuredGenerator,
    ctx: &GameArticleContext,
    pool: &ResearchPool,
    focus: &str,
    categories: &[ResearchCategory],
    config: &AppConfig,
    usage: &mut TokenUsage,
) -> String {
    let entries: Vec<_> = categories
        .iter()
        .flat_map(|category| pool.findings_for(*category))
        .collect();
    if entries.is_empty() {
        return String::new();
    }

    let user = scout_bucket_user(
        ctx,
        focus,
        &entries,
        config.section_top_results,
        config.section_result_char_budget,
    );
    match llm.generate_text(SCOUT_SYSTEM, &user).await {
        Ok(completion) => {
            usage.absorb(completion.usage);
            completion.text.trim().to_string()
        }
        Err(err) => {
            warn!(focus, error = %err, "bucket synthesis failed, stitching findings");
            stitch_bucket(pool, categories)
        }
    }
}

/// Confidence rules, checked in order: more than half the slots empty is
/// `Low`; a populated overview bucket plus a populated category bucket is
/// `High`; anything else is `Medium`.
fn assess_confidence(
    total_slots: usize,
    empty_slots: usize,
    overview_hit: bool,
    category_hit: bool,
) -> Confidence {
    if empty_slots * 2 > total_slots {
        Confidence::Low
    } else if overview_hit && category_hit {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

fn assemble_briefing(
    overview: String,
    category_insights: String,
    recent_developments: String,
) -> Briefing {
    let full_context = [
        overview.as_str(),
        category_insights.as_str(),
        recent_developments.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("\n\n");

    Briefing {
        overview,
        category_insights,
        recent_developments,
        full_context,
    }
}

/// Deterministic bucket text: provider answers where present, leading
/// sentences of the best-scored result otherwise.
fn stitch_bucket(pool: &ResearchPool, categories: &[ResearchCategory]) -> String {
    let mut parts = Vec::new();
    for category in categories {
        for entry in pool.findings_for(*category) {
            if let Some(answer) = &entry.answer {
                parts.push(answer.clone());
            } else if let Some(best) = entry
                .results
                .iter()
                .max_by(|a, b| a.combined().total_cmp(&b.combined()))
            {
                parts.push(leading_sentences(&best.item.content, 2));
            }
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamepress_search::SearchResultItem;

    #[test]
    fn more_than_half_empty_is_low() {
        assert_eq!(assess_confidence(6, 4, true, true), Confidence::Low);
    }

    #[test]
    fn exactly_half_empty_is_not_low() {
        assert_eq!(assess_confidence(6, 3, true, true), Confidence::High);
    }

    #[test]
    fn missing_category_bucket_is_medium() {
        assert_eq!(assess_confidence(6, 1, true, false), Confidence::Medium);
    }

    #[test]
    fn stitch_bucket_prefers_provider_answers() {
        let mut pool = ResearchPool::new();
        pool.record_result(
            "overview query",
            ResearchCategory::Overview,
            vec![SearchResultItem {
                title: "t".to_string(),
                url: "https://a.com/x".to_string(),
                content: "First sentence. Second sentence. Third sentence.".to_string(),
                score: 0.8,
            }],
            Some("Provider answer.".to_string()),
        );
        assert_eq!(stitch_bucket(&pool, OVERVIEW_BUCKET), "Provider answer.");
    }

    #[test]
    fn stitch_bucket_takes_leading_sentences_without_answer() {
        let mut pool = ResearchPool::new();
        pool.record_result(
            "mechanics query",
            ResearchCategory::CategorySpecific,
            vec![SearchResultItem {
                title: "t".to_string(),
                url: "https://a.com/x".to_string(),
                content: "First sentence. Second sentence. Third sentence.".to_string(),
                score: 0.8,
            }],
            None,
        );
        assert_eq!(
            stitch_bucket(&pool, CATEGORY_BUCKET),
            "First sentence. Second sentence."
        );
    }

    #[test]
    fn briefing_full_context_skips_empty_buckets() {
        let briefing = assemble_briefing(
            "Overview text.".to_string(),
            String::new(),
            "Recent text.".to_string(),
        );
        assert_eq!(briefing.full_context, "Overview text.\n\nRecent text.");
    }
}
