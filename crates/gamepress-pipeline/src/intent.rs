//! Deterministic intent classification over the free-text instruction.

use gamepress_core::ArticleIntent;

const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "patch",
    "update",
    "announcement",
    "announced",
    "release date",
    "dlc",
    "roadmap",
];

const REVIEW_KEYWORDS: &[&str] = &[
    "review",
    "worth",
    "impressions",
    "verdict",
    "should i buy",
    "is it good",
];

const LIST_KEYWORDS: &[&str] = &["best", "top ", "ranking", "ranked", "tier list"];

const GUIDE_KEYWORDS: &[&str] = &[
    "guide",
    "walkthrough",
    "how to",
    "tips",
    "tutorial",
    "beat",
    "defeat",
    "unlock",
    "strategy",
    "build",
];

/// Classifies the free-text instruction into an article intent.
///
/// Pure function: the same instruction always yields the same intent.
/// Keyword groups are checked in a fixed precedence order (news, reviews,
/// lists, guides) so instructions mixing signals resolve deterministically.
/// `None` or an instruction with no keyword hits returns `General`.
#[must_use]
pub fn detect_article_intent(instruction: Option<&str>) -> ArticleIntent {
    let Some(raw) = instruction else {
        return ArticleIntent::General;
    };
    let text = raw.to_lowercase();
    if text.trim().is_empty() {
        return ArticleIntent::General;
    }

    if NEWS_KEYWORDS.iter().any(|k| text.contains(k)) {
        return ArticleIntent::News;
    }
    if REVIEW_KEYWORDS.iter().any(|k| text.contains(k)) {
        return ArticleIntent::Reviews;
    }
    if LIST_KEYWORDS.iter().any(|k| text.contains(k)) {
        return ArticleIntent::Lists;
    }
    if GUIDE_KEYWORDS.iter().any(|k| text.contains(k)) {
        return ArticleIntent::Guides;
    }

    ArticleIntent::General
}
