//! Specialist stage: writes one planned section from pooled research.
//!
//! The Specialist consults the research pool first and only searches for
//! queries the Scout never ran. Everything it fetches is recorded back into
//! the pool, so a revision pass reuses it instead of searching again.

use std::collections::HashSet;

use tracing::{debug, warn};

use gamepress_core::{AppConfig, GameArticleContext};
use gamepress_llm::{LlmError, StructuredGenerator, TokenUsage};
use gamepress_search::{SearchDepth, SearchOptions, SearchProvider};

use crate::markdown::{
    extract_image_urls, extract_link_urls, leading_sentences, strip_leading_heading,
    strip_unknown_images,
};
use crate::pool::{normalize_url, ResearchCategory, ResearchPool};
use crate::prompts::{findings_block, specialist_user};
use crate::strategy::CategoryStrategy;
use crate::types::{ArticlePlan, DraftSection, SourcePhase, SourceUsageItem};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// Writes the section at `section_index`.
///
/// Search failures for individual queries are soft: the section is written
/// from whatever research is available. Only the writing call itself can
/// fail the section.
#[allow(clippy::too_many_arguments)]
pub async fn run_specialist_section(
    search: &dyn SearchProvider,
    llm: &dyn StructuredGenerator,
    pool: &mut ResearchPool,
    ctx: &GameArticleContext,
    plan: &ArticlePlan,
    section_index: usize,
    prior_summaries: &[String],
    strategy: &CategoryStrategy,
    config: &AppConfig,
    revision_notes: &[String],
    usage: &mut TokenUsage,
) -> Result<DraftSection, LlmError> {
    let section = &plan.sections[section_index];

    fill_research_gaps(search, pool, section.research_queries.as_slice(), config).await;

    let entries = pool.extract_for_queries(&section.research_queries);
    let findings = if entries.is_empty() {
        warn!(
            section = %section.headline,
            "no research available for section, writing from briefing context only"
        );
        "No research findings matched this section's queries.".to_string()
    } else {
        findings_block(&entries, config.section_top_results, config.section_result_char_budget)
    };

    let mut allowlist: HashSet<String> = HashSet::new();
    let mut source_usage: Vec<SourceUsageItem> = Vec::new();
    for entry in &entries {
        let phase = if entry.category == ResearchCategory::SectionSpecific {
            SourcePhase::Writing
        } else {
            SourcePhase::Scouting
        };
        for scored in &entry.results {
            let normalized = normalize_url(&scored.item.url);
            if !allowlist.insert(normalized) {
                continue;
            }
            source_usage.push(SourceUsageItem {
                url: scored.item.url.clone(),
                title: scored.item.title.clone(),
                content_type: content_type_of(&scored.item.url),
                provider: search.name(),
                query: entry.query.clone(),
                phase,
                section: section_index,
                cited: false,
            });
        }
    }

    let user = specialist_user(
        ctx,
        plan,
        section,
        section_index,
        prior_summaries,
        &findings,
        revision_notes,
    );
    let completion = llm.generate_text(strategy.system_prompt, &user).await?;
    usage.absorb(completion.usage);

    let body = strip_leading_heading(&completion.text, &section.headline);
    let (markdown, discarded_images) = strip_unknown_images(&body, &allowlist);
    if discarded_images > 0 {
        warn!(
            section = %section.headline,
            discarded = discarded_images,
            "stripped images not backed by research"
        );
    }

    mark_citations(&markdown, &mut source_usage);
    debug!(
        section = %section.headline,
        sources = source_usage.len(),
        "section written"
    );

    Ok(DraftSection {
        headline: section.headline.clone(),
        markdown,
        source_usage,
        discarded_images,
    })
}

/// Searches for plan queries the pool has never seen, recording hits as
/// section-specific research.
async fn fill_research_gaps(
    search: &dyn SearchProvider,
    pool: &mut ResearchPool,
    queries: &[String],
    config: &AppConfig,
) {
    for query in queries {
        if pool.lookup(query).is_some() {
            debug!(query = %query, "research pool hit, skipping search");
            continue;
        }
        let options = SearchOptions {
            max_results: config.search_max_results,
            depth: SearchDepth::Basic,
            domain_filters: None,
        };
        match search.search(query, &options).await {
            Ok(response) if !response.results.is_empty() => {
                pool.record_result(
                    query,
                    ResearchCategory::SectionSpecific,
                    response.results,
                    response.answer,
                );
            }
            Ok(_) => debug!(query = %query, "section search returned no results"),
            Err(err) => warn!(query = %query, error = %err, "section search failed"),
        }
    }
}

fn content_type_of(url: &str) -> &'static str {
    let lowered = url.to_lowercase();
    let path = lowered.split(['?', '#']).next().unwrap_or(&lowered);
    if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        "image"
    } else {
        "text"
    }
}

/// Flags every source whose normalized URL the written markdown references,
/// as a link or an image.
fn mark_citations(markdown: &str, source_usage: &mut [SourceUsageItem]) {
    let cited: HashSet<String> = extract_link_urls(markdown)
        .into_iter()
        .chain(extract_image_urls(markdown))
        .map(|url| normalize_url(&url))
        .collect();
    for item in source_usage {
        item.cited = cited.contains(&normalize_url(&item.url));
    }
}

/// One-line summary of a written section, fed to later sections so they
/// avoid repeating it.
#[must_use]
pub fn section_summary(section: &DraftSection) -> String {
    format!(
        "{}: {}",
        section.headline,
        leading_sentences(&section.markdown, 2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_detects_images_ignoring_query_string() {
        assert_eq!(content_type_of("https://a.com/shot.PNG?w=800"), "image");
        assert_eq!(content_type_of("https://a.com/article"), "text");
    }

    #[test]
    fn mark_citations_matches_normalized_urls() {
        let mut usage = vec![SourceUsageItem {
            url: "https://wiki.example/stardew?ref=home".to_string(),
            title: "t".to_string(),
            content_type: "text",
            provider: "tavily",
            query: "q".to_string(),
            phase: SourcePhase::Scouting,
            section: 0,
            cited: false,
        }];
        mark_citations(
            "See [the wiki](https://WIKI.example/stardew).",
            &mut usage,
        );
        assert!(usage[0].cited);
    }

    #[test]
    fn section_summary_trims_to_leading_sentences() {
        let section = DraftSection {
            headline: "First Spring".to_string(),
            markdown: "Plant parsnips. Water daily. Sell at the bin.".to_string(),
            source_usage: Vec::new(),
            discarded_images: 0,
        };
        assert_eq!(
            section_summary(&section),
            "First Spring: Plant parsnips. Water daily."
        );
    }
}
