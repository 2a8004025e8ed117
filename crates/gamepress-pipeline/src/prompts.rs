//! Prompt assembly for every LLM-backed stage.
//!
//! All prompts are built from the research pool and plan data, never from
//! free-form model output, so a prompt can only reference sources the pool
//! actually holds.

use gamepress_core::GameArticleContext;

use crate::markdown::truncate_chars;
use crate::pool::CategorizedSearchResult;
use crate::types::{ArticlePlan, ArticleSectionPlan};

pub const SCOUT_SYSTEM: &str = "You are a research analyst for a gaming wiki. \
Synthesize the provided search findings into one factual briefing paragraph. \
Use only the findings given; never add outside knowledge. \
Respond with plain prose, no heading and no markdown.";

pub const EDITOR_SYSTEM: &str = "You are the managing editor of a gaming wiki. \
Turn a research briefing into a structured article plan. \
Respond with a JSON object with fields: \"title\" (string), \"excerpt\" \
(string, one or two sentences), \"category\" (one of \"news\", \"reviews\", \
\"guides\", \"lists\"), \"tags\" (array of strings), and \"sections\" (array \
of objects with \"headline\", \"goal\", \"research_queries\" (array of \
strings), \"must_cover\" (array of strings)). \
Plan 3 to 6 sections. Every section needs at least one research query.";

pub const REVIEWER_SYSTEM: &str = "You are a senior editor reviewing a draft \
article for a gaming wiki before publication. \
Check factual grounding against the plan, completeness of must-cover items, \
tone, and internal consistency. \
Respond with a JSON object: {\"issues\": [{\"severity\": \"error\" or \
\"warning\", \"message\": string, \"location\": string or null}]}. \
Return an empty issues array when the draft is publishable as-is.";

/// Formats one pool entry as a research block: query header, answer when the
/// provider supplied one, then the top-scored results with truncated content.
fn entry_block(entry: &CategorizedSearchResult, top_results: usize, char_budget: usize) -> String {
    let mut block = format!("### Findings for: {}\n", entry.query);
    if let Some(answer) = &entry.answer {
        block.push_str(&format!("Summary answer: {answer}\n"));
    }
    let mut ranked: Vec<_> = entry.results.iter().collect();
    ranked.sort_by(|a, b| b.combined().total_cmp(&a.combined()));
    for scored in ranked.into_iter().take(top_results) {
        block.push_str(&format!(
            "- [{}]({})\n  {}\n",
            scored.item.title,
            scored.item.url,
            truncate_chars(scored.item.content.trim(), char_budget)
        ));
    }
    block
}

/// Formats a set of pool entries as the research context for one section.
#[must_use]
pub fn findings_block(
    entries: &[&CategorizedSearchResult],
    top_results: usize,
    char_budget: usize,
) -> String {
    entries
        .iter()
        .map(|entry| entry_block(entry, top_results, char_budget))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for synthesizing one briefing bucket from its pool entries.
#[must_use]
pub fn scout_bucket_user(
    ctx: &GameArticleContext,
    focus: &str,
    entries: &[&CategorizedSearchResult],
    top_results: usize,
    char_budget: usize,
) -> String {
    let mut prompt = format!(
        "Game: {}\n{}\nBriefing focus: {focus}\n\nResearch findings:\n\n",
        ctx.game_name,
        ctx.metadata_line()
    );
    prompt.push_str(&findings_block(entries, top_results, char_budget));
    prompt.push_str("\nWrite the briefing paragraph now.");
    prompt
}

/// User prompt for the Editor's planning call.
#[must_use]
pub fn editor_plan_user(
    ctx: &GameArticleContext,
    briefing_context: &str,
    must_cover_suggestions: &[String],
    category_hint: &str,
) -> String {
    let mut prompt = format!(
        "Game: {}\n{}\nRequested focus: {}\nSuggested category: {}\n\nResearch briefing:\n{}\n",
        ctx.game_name,
        ctx.metadata_line(),
        ctx.instruction.as_deref().unwrap_or("(none, general article)"),
        category_hint,
        briefing_context
    );
    if !must_cover_suggestions.is_empty() {
        prompt.push_str("\nWork these points into the section must-cover lists:\n");
        for item in must_cover_suggestions {
            prompt.push_str(&format!("- {item}\n"));
        }
    }
    prompt.push_str("\nProduce the article plan JSON now.");
    prompt
}

/// Corrective retry prompt sent when the Editor's first plan failed
/// validation. Repeats the original request and names the defect.
#[must_use]
pub fn editor_retry_user(original_user: &str, defect: &str) -> String {
    format!(
        "{original_user}\n\nYour previous plan was rejected: {defect}\n\
         Fix this and return the corrected plan JSON. Keep all other fields intact."
    )
}

/// User prompt for writing one section.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn specialist_user(
    ctx: &GameArticleContext,
    plan: &ArticlePlan,
    section: &ArticleSectionPlan,
    section_index: usize,
    prior_summaries: &[String],
    findings: &str,
    revision_notes: &[String],
) -> String {
    let mut prompt = format!(
        "Article: {} ({})\nExcerpt: {}\nGame: {}\n{}\n\n\
         You are writing section {} of {}: \"{}\"\nSection goal: {}\n",
        plan.title,
        plan.category.as_slug(),
        plan.excerpt,
        ctx.game_name,
        ctx.metadata_line(),
        section_index + 1,
        plan.sections.len(),
        section.headline,
        section.goal
    );

    if !section.must_cover.is_empty() {
        prompt.push_str("\nThis section must cover:\n");
        for item in &section.must_cover {
            prompt.push_str(&format!("- {item}\n"));
        }
    }

    if !prior_summaries.is_empty() {
        prompt.push_str("\nAlready covered in earlier sections (do not repeat):\n");
        for summary in prior_summaries {
            prompt.push_str(&format!("- {summary}\n"));
        }
    }

    prompt.push_str("\nResearch for this section:\n");
    prompt.push_str(findings);

    if plan.safety.no_scores_unless_review {
        prompt.push_str("\nDo not assign numeric review scores; this is not a review.\n");
    }

    if !revision_notes.is_empty() {
        prompt.push_str("\nA previous draft of this section had problems. Fix all of them:\n");
        for note in revision_notes {
            prompt.push_str(&format!("- {note}\n"));
        }
    }

    prompt.push_str(
        "\nWrite the section markdown now. No heading; markdown images only \
         from URLs present in the research above.",
    );
    prompt
}

/// User prompt for the Reviewer's holistic pass. The research summary lets
/// the Reviewer judge grounding, not just tone.
#[must_use]
pub fn reviewer_user(plan: &ArticlePlan, markdown: &str, research_context: &str) -> String {
    let mut prompt = format!(
        "Title: {}\nCategory: {}\nExcerpt: {}\n\nPlanned sections and must-cover items:\n",
        plan.title,
        plan.category.as_slug(),
        plan.excerpt
    );
    for section in &plan.sections {
        prompt.push_str(&format!("- {}: {}\n", section.headline, section.goal));
        for item in &section.must_cover {
            prompt.push_str(&format!("  * must cover: {item}\n"));
        }
    }
    if !research_context.trim().is_empty() {
        prompt.push_str("\nResearch summary the draft must stay grounded in:\n");
        prompt.push_str(research_context);
        prompt.push('\n');
    }
    prompt.push_str("\nDraft:\n\n");
    prompt.push_str(markdown);
    prompt.push_str("\n\nReturn the issues JSON now.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{ResearchCategory, ResearchPool};
    use crate::types::SafetyFlags;
    use gamepress_core::ArticleCategory;
    use gamepress_search::SearchResultItem;

    fn plan() -> ArticlePlan {
        ArticlePlan {
            title: "Stardew Valley Farming Guide".to_string(),
            excerpt: "Get your farm going.".to_string(),
            category: ArticleCategory::Guides,
            tags: vec!["farming".to_string()],
            sections: vec![ArticleSectionPlan {
                headline: "First Spring".to_string(),
                goal: "Explain the opening days".to_string(),
                research_queries: vec!["Stardew Valley beginner tips".to_string()],
                must_cover: vec!["Parsnip seeds".to_string()],
            }],
            safety: SafetyFlags {
                no_scores_unless_review: true,
            },
        }
    }

    #[test]
    fn scout_bucket_prompt_carries_focus_and_findings() {
        let mut pool = ResearchPool::new();
        pool.record_result(
            "Stardew Valley game overview story setting",
            ResearchCategory::Overview,
            vec![SearchResultItem {
                title: "Stardew Valley wiki".to_string(),
                url: "https://wiki.example/stardew".to_string(),
                content: "A farming sim by ConcernedApe.".to_string(),
                score: 0.9,
            }],
            None,
        );
        let ctx = GameArticleContext::new("Stardew Valley");
        let entries: Vec<_> = pool.findings_for(ResearchCategory::Overview).collect();
        let prompt = scout_bucket_user(&ctx, "what the game is", &entries, 3, 400);
        assert!(prompt.contains("Briefing focus: what the game is"));
        assert!(prompt.contains("wiki.example/stardew"));
    }

    #[test]
    fn specialist_prompt_carries_revision_notes_and_safety() {
        let ctx = GameArticleContext::new("Stardew Valley");
        let p = plan();
        let prompt = specialist_user(
            &ctx,
            &p,
            &p.sections[0],
            0,
            &["Covered the town map.".to_string()],
            "### Findings for: beginner tips\n- result\n",
            &["Placeholder text [TBD] present".to_string()],
        );
        assert!(prompt.contains("do not repeat"));
        assert!(prompt.contains("[TBD]"));
        assert!(prompt.contains("numeric review scores"));
    }

    #[test]
    fn editor_retry_names_the_defect() {
        let retry = editor_retry_user("original request", "plan had zero sections");
        assert!(retry.contains("original request"));
        assert!(retry.contains("zero sections"));
    }

    #[test]
    fn reviewer_prompt_lists_must_cover_and_research() {
        let prompt = reviewer_user(
            &plan(),
            "## First Spring\n\nPlant parsnips.",
            "Parsnips grow in four days.",
        );
        assert!(prompt.contains("must cover: Parsnip seeds"));
        assert!(prompt.contains("Plant parsnips."));
        assert!(prompt.contains("grow in four days"));
    }
}
