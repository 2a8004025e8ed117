//! Immutable per-request article context and the category/intent enums.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The fixed set of article categories the site publishes under.
///
/// Editor output is normalized into this enum before a plan is accepted;
/// free-form category strings never leave the planning stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleCategory {
    News,
    Reviews,
    Guides,
    Lists,
}

impl ArticleCategory {
    /// The category slug as stored by the content backend.
    #[must_use]
    pub fn as_slug(self) -> &'static str {
        match self {
            ArticleCategory::News => "news",
            ArticleCategory::Reviews => "reviews",
            ArticleCategory::Guides => "guides",
            ArticleCategory::Lists => "lists",
        }
    }

    /// All categories, in display order.
    #[must_use]
    pub fn all() -> [ArticleCategory; 4] {
        [
            ArticleCategory::News,
            ArticleCategory::Reviews,
            ArticleCategory::Guides,
            ArticleCategory::Lists,
        ]
    }

    /// Parses a raw category string into a known category.
    ///
    /// Matching is tiered: exact slug, then a singular/alias table
    /// (`"guide"` → `Guides`, `"review"` → `Reviews`), then substring
    /// containment in either direction against the known slugs. Returns
    /// `None` when nothing matches; the caller decides the fallback.
    #[must_use]
    pub fn parse_slug(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }

        for category in Self::all() {
            if s == category.as_slug() {
                return Some(category);
            }
        }

        let aliased = match s.as_str() {
            "guide" | "how-to" | "howto" | "walkthrough" | "tutorial" => {
                Some(ArticleCategory::Guides)
            }
            "review" | "impressions" => Some(ArticleCategory::Reviews),
            "list" | "ranking" | "rankings" | "top" => Some(ArticleCategory::Lists),
            "new" | "announcement" | "update" => Some(ArticleCategory::News),
            _ => None,
        };
        if aliased.is_some() {
            return aliased;
        }

        // Substring match in either direction, e.g. "game guides" or "guid".
        Self::all()
            .into_iter()
            .find(|category| s.contains(category.as_slug()) || category.as_slug().contains(&s))
    }
}

impl std::fmt::Display for ArticleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

/// Intent detected from the free-text generation instruction.
///
/// Unlike [`ArticleCategory`], this includes `General` for requests that do
/// not signal a category. Detection itself lives in the pipeline crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleIntent {
    News,
    Reviews,
    Guides,
    Lists,
    General,
}

impl ArticleIntent {
    /// The category this intent maps to when a concrete one is needed.
    /// `General` falls back to `Guides`, the site's default long-form shape.
    #[must_use]
    pub fn category(self) -> ArticleCategory {
        match self {
            ArticleIntent::News => ArticleCategory::News,
            ArticleIntent::Reviews => ArticleCategory::Reviews,
            ArticleIntent::Guides | ArticleIntent::General => ArticleCategory::Guides,
            ArticleIntent::Lists => ArticleCategory::Lists,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleIntent::News => "news",
            ArticleIntent::Reviews => "reviews",
            ArticleIntent::Guides => "guides",
            ArticleIntent::Lists => "lists",
            ArticleIntent::General => "general",
        }
    }
}

impl std::fmt::Display for ArticleIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable input for one article-generation run.
///
/// Created once per request and read-only throughout the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameArticleContext {
    pub game_name: String,
    pub game_slug: String,
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    /// Free-text instruction from the requester, e.g. "beginner farming tips".
    pub instruction: Option<String>,
    /// Per-category system-prompt overrides supplied by the caller.
    #[serde(default)]
    pub category_hints: HashMap<ArticleCategory, String>,
}

impl GameArticleContext {
    /// Minimal context from a game name; the slug is derived by lowercasing
    /// and replacing whitespace runs with hyphens.
    #[must_use]
    pub fn new(game_name: &str) -> Self {
        let game_slug = game_name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        Self {
            game_name: game_name.trim().to_string(),
            game_slug,
            release_date: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            developer: None,
            publisher: None,
            instruction: None,
            category_hints: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_instruction(mut self, instruction: &str) -> Self {
        self.instruction = Some(instruction.to_string());
        self
    }

    /// One-line summary of the game's known metadata for prompt context.
    #[must_use]
    pub fn metadata_line(&self) -> String {
        let mut parts = vec![self.game_name.clone()];
        if let Some(date) = self.release_date {
            parts.push(format!("released {date}"));
        }
        if !self.genres.is_empty() {
            parts.push(format!("genres: {}", self.genres.join(", ")));
        }
        if !self.platforms.is_empty() {
            parts.push(format!("platforms: {}", self.platforms.join(", ")));
        }
        if let Some(dev) = &self.developer {
            parts.push(format!("developer: {dev}"));
        }
        if let Some(publisher) = &self.publisher {
            parts.push(format!("publisher: {publisher}"));
        }
        parts.join(" | ")
    }
}
