//! Per-category research and writing strategies.
//!
//! Each article category carries its own query-slot templates, Specialist
//! system prompt, and must-cover heuristics. Strategies live in a registry
//! built once at startup and resolved by enum variant, never by string key.

use gamepress_core::{ArticleCategory, ArticleIntent, GameArticleContext};
use gamepress_search::{SearchDepth, SearchOptions};

use crate::pool::ResearchCategory;

/// One configured search query: category tag plus execution parameters.
#[derive(Debug, Clone)]
pub struct QuerySlot {
    pub label: &'static str,
    pub query: String,
    pub category: ResearchCategory,
    pub options: SearchOptions,
}

/// Query template: suffix appended to the game name, with its category tag
/// and depth.
struct SlotTemplate {
    label: &'static str,
    suffix: &'static str,
    category: ResearchCategory,
    depth: SearchDepth,
}

/// Slots every article gets regardless of category.
const COMMON_TEMPLATES: &[SlotTemplate] = &[
    SlotTemplate {
        label: "overview",
        suffix: "game overview story setting",
        category: ResearchCategory::Overview,
        depth: SearchDepth::Basic,
    },
    SlotTemplate {
        label: "recent",
        suffix: "latest news updates",
        category: ResearchCategory::Recent,
        depth: SearchDepth::Basic,
    },
    SlotTemplate {
        label: "meta",
        suffix: "community reception discussion",
        category: ResearchCategory::Meta,
        depth: SearchDepth::Basic,
    },
];

/// Strategy for one article category: research slots plus writing rules.
pub struct CategoryStrategy {
    pub intent: ArticleIntent,
    /// Specialist system prompt carrying the category's tone and rules.
    pub system_prompt: &'static str,
    category_templates: &'static [SlotTemplate],
    /// Must-cover items every article of this category needs.
    baseline_must_cover: &'static [&'static str],
}

impl CategoryStrategy {
    /// Builds the full slot set for a run: common slots, category slots, and
    /// an instruction-derived slot when the caller supplied one.
    #[must_use]
    pub fn build_slots(&self, ctx: &GameArticleContext, max_results: usize) -> Vec<QuerySlot> {
        let mut slots = Vec::new();

        for template in COMMON_TEMPLATES.iter().chain(self.category_templates) {
            slots.push(QuerySlot {
                label: template.label,
                query: format!("{} {}", ctx.game_name, template.suffix),
                category: template.category,
                options: SearchOptions {
                    max_results,
                    depth: template.depth,
                    domain_filters: None,
                },
            });
        }

        if let Some(instruction) = &ctx.instruction {
            slots.push(QuerySlot {
                label: "instruction",
                query: format!("{} {}", ctx.game_name, instruction.trim()),
                category: ResearchCategory::CategorySpecific,
                options: SearchOptions {
                    max_results,
                    depth: SearchDepth::Advanced,
                    domain_filters: None,
                },
            });
        }

        slots
    }

    /// Deterministic must-cover suggestions merged into the Editor prompt.
    ///
    /// These nudge the plan toward completeness; the final must-cover lists
    /// are still LLM output and are enforced later by validation and review.
    #[must_use]
    pub fn suggested_must_cover(&self, ctx: &GameArticleContext) -> Vec<String> {
        let mut suggestions: Vec<String> = self
            .baseline_must_cover
            .iter()
            .map(|s| (*s).to_string())
            .collect();

        if let Some(instruction) = &ctx.instruction {
            suggestions.push(format!("Directly address the request: {instruction}"));
        }
        for genre in &ctx.genres {
            suggestions.push(format!("Relate the content to the {genre} genre"));
        }
        if let Some(date) = ctx.release_date {
            suggestions.push(format!("Mention the release date ({date})"));
        }
        if !ctx.platforms.is_empty() {
            suggestions.push(format!(
                "Note platform availability: {}",
                ctx.platforms.join(", ")
            ));
        }

        suggestions
    }
}

/// All category strategies, built once at startup.
pub struct StrategyRegistry {
    news: CategoryStrategy,
    reviews: CategoryStrategy,
    guides: CategoryStrategy,
    lists: CategoryStrategy,
    general: CategoryStrategy,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            news: CategoryStrategy {
                intent: ArticleIntent::News,
                system_prompt: NEWS_SYSTEM,
                category_templates: &[SlotTemplate {
                    label: "patches",
                    suffix: "patch notes roadmap announcement",
                    category: ResearchCategory::CategorySpecific,
                    depth: SearchDepth::Advanced,
                }],
                baseline_must_cover: &[
                    "Anchor every claim to a dated source",
                    "State what changed and when",
                ],
            },
            reviews: CategoryStrategy {
                intent: ArticleIntent::Reviews,
                system_prompt: REVIEWS_SYSTEM,
                category_templates: &[
                    SlotTemplate {
                        label: "critique",
                        suffix: "review strengths weaknesses",
                        category: ResearchCategory::CategorySpecific,
                        depth: SearchDepth::Advanced,
                    },
                    SlotTemplate {
                        label: "comparison",
                        suffix: "compared to similar games",
                        category: ResearchCategory::Tips,
                        depth: SearchDepth::Basic,
                    },
                ],
                baseline_must_cover: &[
                    "Cover both strengths and weaknesses",
                    "Describe who the game is for",
                ],
            },
            guides: CategoryStrategy {
                intent: ArticleIntent::Guides,
                system_prompt: GUIDES_SYSTEM,
                category_templates: &[
                    SlotTemplate {
                        label: "mechanics",
                        suffix: "gameplay mechanics explained",
                        category: ResearchCategory::CategorySpecific,
                        depth: SearchDepth::Advanced,
                    },
                    SlotTemplate {
                        label: "tips",
                        suffix: "beginner tips tricks",
                        category: ResearchCategory::Tips,
                        depth: SearchDepth::Basic,
                    },
                ],
                baseline_must_cover: &[
                    "Give concrete, step-by-step actions",
                    "Name exact locations, items, or menu paths",
                ],
            },
            lists: CategoryStrategy {
                intent: ArticleIntent::Lists,
                system_prompt: LISTS_SYSTEM,
                category_templates: &[
                    SlotTemplate {
                        label: "candidates",
                        suffix: "best options ranked comparison",
                        category: ResearchCategory::CategorySpecific,
                        depth: SearchDepth::Advanced,
                    },
                    SlotTemplate {
                        label: "tips",
                        suffix: "which to choose and why",
                        category: ResearchCategory::Tips,
                        depth: SearchDepth::Basic,
                    },
                ],
                baseline_must_cover: &[
                    "State the ranking criteria explicitly",
                    "Justify each entry's placement",
                ],
            },
            general: CategoryStrategy {
                intent: ArticleIntent::General,
                system_prompt: GUIDES_SYSTEM,
                category_templates: &[SlotTemplate {
                    label: "mechanics",
                    suffix: "gameplay features explained",
                    category: ResearchCategory::CategorySpecific,
                    depth: SearchDepth::Basic,
                }],
                baseline_must_cover: &["Explain what makes the game distinctive"],
            },
        }
    }

    /// Strategy for a detected instruction intent.
    #[must_use]
    pub fn get(&self, intent: ArticleIntent) -> &CategoryStrategy {
        match intent {
            ArticleIntent::News => &self.news,
            ArticleIntent::Reviews => &self.reviews,
            ArticleIntent::Guides => &self.guides,
            ArticleIntent::Lists => &self.lists,
            ArticleIntent::General => &self.general,
        }
    }

    /// Strategy for the plan's final category (used by the Specialist once
    /// the Editor has fixed the category).
    #[must_use]
    pub fn for_category(&self, category: ArticleCategory) -> &CategoryStrategy {
        match category {
            ArticleCategory::News => &self.news,
            ArticleCategory::Reviews => &self.reviews,
            ArticleCategory::Guides => &self.guides,
            ArticleCategory::Lists => &self.lists,
        }
    }
}

const NEWS_SYSTEM: &str = "You are a games journalist writing a news section for a gaming wiki. \
Report only what the provided research supports. Date every development you mention. \
Keep speculation clearly labelled as such. Never invent quotes or figures. \
Write tight, factual markdown prose without a heading.";

const REVIEWS_SYSTEM: &str = "You are a games critic writing one section of a review for a gaming wiki. \
Balance strengths and weaknesses; a section that only praises or only criticizes is incomplete. \
Ground every judgement in specifics from the provided research. \
Write measured, concrete markdown prose without a heading.";

const GUIDES_SYSTEM: &str = "You are a guide writer for a gaming wiki. \
Give actionable, concrete instructions. Vague location references like 'somewhere in the early game' \
are forbidden: name the place, item, or menu path exactly as the research states it. \
Prefer numbered steps for processes. Write markdown prose without a heading.";

const LISTS_SYSTEM: &str = "You are writing one section of a ranked list article for a gaming wiki. \
Make the ranking criteria explicit and apply them consistently. \
Justify every placement with specifics from the provided research. \
Write markdown prose without a heading.";

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GameArticleContext {
        GameArticleContext::new("Stardew Valley").with_instruction("beginner farming tips")
    }

    #[test]
    fn build_slots_includes_common_and_category_slots() {
        let registry = StrategyRegistry::new();
        let strategy = registry.get(ArticleIntent::Guides);
        let slots = strategy.build_slots(&ctx(), 5);

        let labels: Vec<_> = slots.iter().map(|s| s.label).collect();
        assert!(labels.contains(&"overview"));
        assert!(labels.contains(&"recent"));
        assert!(labels.contains(&"mechanics"));
        assert!(labels.contains(&"tips"));
        assert!(labels.contains(&"instruction"));
        assert!(slots.iter().all(|s| s.query.contains("Stardew Valley")));
    }

    #[test]
    fn build_slots_omits_instruction_slot_without_instruction() {
        let registry = StrategyRegistry::new();
        let strategy = registry.get(ArticleIntent::General);
        let slots = strategy.build_slots(&GameArticleContext::new("Hades"), 5);
        assert!(slots.iter().all(|s| s.label != "instruction"));
    }

    #[test]
    fn suggested_must_cover_merges_instruction_and_genres() {
        let registry = StrategyRegistry::new();
        let mut context = ctx();
        context.genres = vec!["Farming Sim".to_string()];
        let suggestions = registry
            .get(ArticleIntent::Guides)
            .suggested_must_cover(&context);
        assert!(suggestions
            .iter()
            .any(|s| s.contains("beginner farming tips")));
        assert!(suggestions.iter().any(|s| s.contains("Farming Sim")));
        assert!(suggestions
            .iter()
            .any(|s| s.contains("step-by-step")));
    }

    #[test]
    fn registry_resolves_every_category() {
        let registry = StrategyRegistry::new();
        for category in ArticleCategory::all() {
            let strategy = registry.for_category(category);
            assert!(!strategy.system_prompt.is_empty());
        }
    }
}
