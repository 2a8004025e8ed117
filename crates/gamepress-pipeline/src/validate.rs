//! Deterministic draft validation.
//!
//! These checks run before (and independently of) the LLM Reviewer, so a
//! draft with placeholder text or a structural defect is caught even when
//! review is unavailable. Error-severity issues feed the revision loop;
//! warnings ride along on the final draft.

use regex::Regex;

use crate::types::{ArticlePlan, DraftSection, Severity, ValidationIssue};

/// Text fragments that mean the model left a hole in the draft.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "[tbd]",
    "[todo]",
    "[insert",
    "[placeholder",
    "lorem ipsum",
    "{{",
    "xxx",
];

/// Stock filler phrases that read as machine-written. Warnings only.
const CLICHE_PHRASES: &[&str] = &[
    "in the ever-evolving world",
    "in today's gaming landscape",
    "look no further",
    "it's important to note",
    "a testament to",
    "without further ado",
    "dive into the world of",
];

/// Matches numeric review scores: "8/10", "9.5 out of 10", "4/5 stars".
fn score_regex() -> Regex {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:/\s*(?:5|10|100)\b|out of (?:5|10|100)\b)")
        .expect("valid review score regex")
}

fn section_location(section: &DraftSection) -> Option<String> {
    Some(format!("section \"{}\"", section.headline))
}

/// Runs every deterministic check against the written sections and the
/// assembled markdown. Returns all findings; never short-circuits.
#[must_use]
pub fn validate_draft(
    plan: &ArticlePlan,
    sections: &[DraftSection],
    markdown: &str,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for section in sections {
        check_section_text(section, plan, &mut issues);
    }
    check_structure(plan, sections, markdown, &mut issues);

    issues
}

fn check_section_text(
    section: &DraftSection,
    plan: &ArticlePlan,
    issues: &mut Vec<ValidationIssue>,
) {
    let lowered = section.markdown.to_lowercase();

    if section.markdown.trim().is_empty() {
        issues.push(ValidationIssue::error(
            "section body is empty",
            section_location(section),
        ));
        return;
    }

    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            issues.push(ValidationIssue::error(
                format!("placeholder text \"{pattern}\" left in draft"),
                section_location(section),
            ));
        }
    }

    for phrase in CLICHE_PHRASES {
        if lowered.contains(phrase) {
            issues.push(ValidationIssue::warning(
                format!("stock phrase \"{phrase}\" reads as filler"),
                section_location(section),
            ));
        }
    }

    if plan.safety.no_scores_unless_review && score_regex().is_match(&section.markdown) {
        issues.push(ValidationIssue::error(
            "numeric review score in a non-review article",
            section_location(section),
        ));
    }
}

/// Every written headline must appear exactly once as an `##` heading, and
/// the assembled draft must not carry headings outside the written sections.
fn check_structure(
    plan: &ArticlePlan,
    sections: &[DraftSection],
    markdown: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let headings: Vec<&str> = markdown
        .lines()
        .filter_map(|line| line.strip_prefix("## "))
        .map(str::trim)
        .collect();

    for section in sections {
        let count = headings
            .iter()
            .filter(|h| h.eq_ignore_ascii_case(section.headline.trim()))
            .count();
        if count != 1 {
            issues.push(ValidationIssue::error(
                format!("heading appears {count} times, expected exactly once"),
                section_location(section),
            ));
        }
    }

    if headings.len() > sections.len() {
        issues.push(ValidationIssue::warning(
            format!(
                "draft has {} top-level headings for {} written sections",
                headings.len(),
                sections.len()
            ),
            None,
        ));
    }

    if sections.len() < plan.sections.len() {
        issues.push(ValidationIssue::warning(
            format!(
                "only {} of {} planned sections were written",
                sections.len(),
                plan.sections.len()
            ),
            None,
        ));
    }
}

/// True when any issue is error severity; drives the revision loop.
#[must_use]
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
