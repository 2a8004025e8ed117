//! Markdown post-processing helpers: image/citation extraction, the
//! hallucinated-image guard, truncation, and draft assembly.

use std::collections::HashSet;

use regex::Regex;

use crate::pool::normalize_url;
use crate::types::DraftSection;

/// Matches markdown images and links; group 1 captures the URL. A leading
/// `!` distinguishes images from plain links at the match site.
fn link_regex() -> Regex {
    Regex::new(r"!?\[[^\]]*\]\(([^)\s]+)[^)]*\)").expect("valid markdown link regex")
}

/// Extracts all image URLs (`![alt](url)`) from markdown, in order.
#[must_use]
pub fn extract_image_urls(markdown: &str) -> Vec<String> {
    link_regex()
        .captures_iter(markdown)
        .filter(|caps| caps.get(0).is_some_and(|m| m.as_str().starts_with('!')))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Extracts all non-image link URLs (`[text](url)`) from markdown, in order.
#[must_use]
pub fn extract_link_urls(markdown: &str) -> Vec<String> {
    link_regex()
        .captures_iter(markdown)
        .filter(|caps| caps.get(0).is_some_and(|m| !m.as_str().starts_with('!')))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Removes markdown images whose normalized URL is not in the allowlist.
///
/// Returns the cleaned markdown and the number of images discarded. Unmatched
/// images are stripped rather than flagged because a dangling hallucinated
/// image breaks rendering.
#[must_use]
pub fn strip_unknown_images(markdown: &str, allowlist: &HashSet<String>) -> (String, usize) {
    let re = link_regex();
    let mut discarded = 0usize;
    let cleaned = re.replace_all(markdown, |caps: &regex::Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        if !whole.starts_with('!') {
            return whole.to_string();
        }
        let url = caps.get(1).map_or("", |m| m.as_str());
        if allowlist.contains(&normalize_url(url)) {
            whole.to_string()
        } else {
            discarded += 1;
            String::new()
        }
    });
    (cleaned.into_owned(), discarded)
}

/// Truncates a string to at most `budget` characters, appending an ellipsis
/// when content was dropped. Safe on multi-byte input.
#[must_use]
pub fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(budget).collect();
    truncated.push('…');
    truncated
}

/// First `n` sentences of a text, for compact cross-reference summaries.
#[must_use]
pub fn leading_sentences(text: &str, n: usize) -> String {
    let mut out = String::new();
    let mut count = 0usize;
    for chunk in text.split_inclusive(['.', '!', '?']) {
        out.push_str(chunk);
        count += 1;
        if count >= n {
            break;
        }
    }
    out.trim().to_string()
}

/// Drops a leading `## headline` line the model emitted despite instructions;
/// the assembler adds headings itself, and a duplicate would fail the
/// exactly-once structural check.
#[must_use]
pub fn strip_leading_heading(markdown: &str, headline: &str) -> String {
    let trimmed = markdown.trim_start();
    if let Some(first_line) = trimmed.lines().next() {
        let heading = first_line.trim_start_matches('#').trim();
        if first_line.starts_with('#') && heading.eq_ignore_ascii_case(headline.trim()) {
            return trimmed
                .lines()
                .skip(1)
                .collect::<Vec<_>>()
                .join("\n")
                .trim_start()
                .to_string();
        }
    }
    markdown.trim().to_string()
}

/// Assembles the final article markdown: `## headline` blocks in plan order.
#[must_use]
pub fn assemble_draft(sections: &[DraftSection]) -> String {
    sections
        .iter()
        .map(|s| format!("## {}\n\n{}", s.headline, s.markdown.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
