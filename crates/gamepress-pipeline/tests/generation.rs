//! End-to-end generation tests with mocked search and LLM backends.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use gamepress_core::{AppConfig, ArticleCategory, Environment, GameArticleContext};
use gamepress_llm::{Completion, JsonCompletion, LlmError, StructuredGenerator, TokenUsage};
use gamepress_pipeline::scout::run_scout;
use gamepress_pipeline::{
    detect_article_intent, generate_game_article_draft, normalize_query, GenerationOptions,
    PipelineError, Severity, SourcePhase, Stage, StrategyRegistry,
};
use gamepress_search::{SearchError, SearchOptions, SearchProvider, SearchResponse, SearchResultItem};

const WIKI_URL: &str = "https://wiki.example/stardew";
const NEWS_URL: &str = "https://news.example/stardew-update";
const PROVIDER_ANSWER: &str = "Parsnips are the classic first crop in Stardew Valley.";

fn test_config() -> AppConfig {
    AppConfig {
        env: Environment::Development,
        log_level: "debug".to_string(),
        search_api_key: Some("test-key".to_string()),
        search_base_url: "https://api.tavily.invalid".to_string(),
        search_timeout_secs: 5,
        search_max_results: 5,
        llm_api_key: Some("test-key".to_string()),
        llm_base_url: "https://llm.invalid".to_string(),
        llm_model: "test-model".to_string(),
        llm_timeout_secs: 5,
        llm_max_retries: 0,
        llm_retry_backoff_base_ms: 1,
        section_top_results: 3,
        section_result_char_budget: 400,
        max_revision_attempts: 2,
    }
}

fn ctx() -> GameArticleContext {
    GameArticleContext::new("Stardew Valley").with_instruction("beginner farming tips")
}

#[derive(Clone, Copy)]
enum SearchMode {
    Results,
    Empty,
    Fail,
}

struct MockSearch {
    mode: SearchMode,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(
        &self,
        query: &str,
        _options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.mode {
            SearchMode::Results => Ok(SearchResponse {
                results: vec![
                    SearchResultItem {
                        title: "Stardew Valley Wiki".to_string(),
                        url: WIKI_URL.to_string(),
                        content: "Parsnip seeds cost 20g at Pierre's General Store. \
                                  They grow in four days during spring."
                            .to_string(),
                        score: 0.92,
                    },
                    SearchResultItem {
                        title: "Update 1.6 Notes".to_string(),
                        url: NEWS_URL.to_string(),
                        content: "The 1.6 update added new festivals and late-game content."
                            .to_string(),
                        score: 0.75,
                    },
                ],
                answer: Some(PROVIDER_ANSWER.to_string()),
            }),
            SearchMode::Empty => Ok(SearchResponse::default()),
            SearchMode::Fail => Err(SearchError::ApiError("backend down".to_string())),
        }
    }
}

struct MockLlm {
    plan: Value,
    bad_first_plan: bool,
    fail_review: bool,
    fail_scout: bool,
    section_texts: Mutex<VecDeque<String>>,
    section_prompts: Mutex<Vec<String>>,
    editor_calls: AtomicU32,
    text_calls: AtomicU32,
}

impl MockLlm {
    fn new(plan: Value) -> Self {
        Self {
            plan,
            bad_first_plan: false,
            fail_review: false,
            fail_scout: false,
            section_texts: Mutex::new(VecDeque::new()),
            section_prompts: Mutex::new(Vec::new()),
            editor_calls: AtomicU32::new(0),
            text_calls: AtomicU32::new(0),
        }
    }

    fn recorded_section_prompts(&self) -> Vec<String> {
        self.section_prompts.lock().unwrap().clone()
    }

    fn with_section_texts(self, texts: &[&str]) -> Self {
        *self.section_texts.lock().unwrap() =
            texts.iter().map(|t| (*t).to_string()).collect();
        self
    }

    fn usage() -> TokenUsage {
        TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 50,
        }
    }
}

const DEFAULT_SECTION_TEXT: &str = "Plant parsnips as soon as you wake on day one. \
See [the wiki](https://wiki.example/stardew) for seed prices and growth times.";

#[async_trait]
impl StructuredGenerator for MockLlm {
    async fn generate_text(&self, system: &str, user: &str) -> Result<Completion, LlmError> {
        if system.contains("research analyst") {
            if self.fail_scout {
                return Err(LlmError::ApiError("synthesis backend down".to_string()));
            }
            return Ok(Completion {
                text: "Stardew Valley is a farming sim with deep seasonal mechanics.".to_string(),
                usage: Self::usage(),
            });
        }
        self.section_prompts.lock().unwrap().push(user.to_string());
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        let text = self
            .section_texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| DEFAULT_SECTION_TEXT.to_string());
        Ok(Completion {
            text,
            usage: Self::usage(),
        })
    }

    async fn generate_json(&self, system: &str, _user: &str) -> Result<JsonCompletion, LlmError> {
        let value = if system.contains("managing editor") {
            let call = self.editor_calls.fetch_add(1, Ordering::SeqCst);
            if self.bad_first_plan && call == 0 {
                json!({
                    "title": "Broken Plan",
                    "excerpt": "x",
                    "category": "guides",
                    "tags": [],
                    "sections": []
                })
            } else {
                self.plan.clone()
            }
        } else if system.contains("reviewing") {
            if self.fail_review {
                return Err(LlmError::ApiError("review backend down".to_string()));
            }
            json!({ "issues": [] })
        } else {
            json!({})
        };
        Ok(JsonCompletion {
            value,
            usage: Self::usage(),
        })
    }
}

fn guides_plan() -> Value {
    json!({
        "title": "Stardew Valley Beginner Farming Guide",
        "excerpt": "Everything your first farm needs.",
        "category": "guides",
        "tags": ["farming", "beginner"],
        "sections": [
            {
                "headline": "Your First Spring",
                "goal": "Walk through the opening days",
                "research_queries": ["Stardew Valley beginner tips tricks"],
                "must_cover": ["Parsnip seeds"]
            },
            {
                "headline": "Beyond the Farm",
                "goal": "Point at mid-game activities",
                "research_queries": ["Stardew Valley gameplay mechanics explained"],
                "must_cover": []
            }
        ]
    })
}

#[tokio::test]
async fn full_run_produces_clean_guides_draft() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan());
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(draft.title, "Stardew Valley Beginner Farming Guide");
    assert_eq!(draft.category, ArticleCategory::Guides);
    assert_eq!(draft.sections.len(), 2);

    let first = draft.markdown.find("## Your First Spring").unwrap();
    let second = draft.markdown.find("## Beyond the Farm").unwrap();
    assert!(first < second);

    assert!(!draft
        .issues
        .iter()
        .any(|i| i.severity == Severity::Error));
    assert_eq!(draft.confidence, gamepress_pipeline::Confidence::High);
    assert!(draft.usage.total() > 0);
    assert!(draft.source_urls.contains(&WIKI_URL.to_string()));
}

#[tokio::test]
async fn pool_sources_are_attributed_and_cited() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan());
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    let usage = &draft.sections[0].source_usage;
    let wiki = usage.iter().find(|s| s.url == WIKI_URL).unwrap();
    assert!(wiki.cited, "linked source must be marked cited");
    assert_eq!(wiki.phase, SourcePhase::Scouting);
    assert_eq!(wiki.section, 0);
    assert_eq!(wiki.provider, "mock");

    let news = usage.iter().find(|s| s.url == NEWS_URL).unwrap();
    assert!(!news.cited);
}

#[tokio::test]
async fn plan_queries_matching_scout_queries_are_not_searched_again() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan());
    generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    let queries = search.recorded_queries();
    // 3 common slots + 2 guides slots + 1 instruction slot, nothing more.
    assert_eq!(queries.len(), 6);
    let mut normalized: Vec<String> = queries.iter().map(|q| normalize_query(q)).collect();
    normalized.sort();
    normalized.dedup();
    assert_eq!(normalized.len(), 6, "no query may run twice");
}

#[tokio::test]
async fn failing_search_yields_low_confidence_draft() {
    let search = MockSearch::new(SearchMode::Fail);
    let llm = MockLlm::new(guides_plan());
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(draft.confidence, gamepress_pipeline::Confidence::Low);
    assert_eq!(draft.sections.len(), 2);
}

#[tokio::test]
async fn hallucinated_images_are_stripped_and_counted() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan()).with_section_texts(&[
        "Plant parsnips early. ![farm map](https://fabricated.example/map.png) \
         See [the wiki](https://wiki.example/stardew) for details.",
    ]);
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(draft.sections[0].discarded_images, 1);
    assert!(!draft.markdown.contains("fabricated.example"));
    assert!(draft.markdown.contains("wiki.example/stardew"));
}

#[tokio::test]
async fn pre_cancelled_token_aborts_before_scouting() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan());
    let options = GenerationOptions::default();
    options.cancel.cancel();

    let err = generate_game_article_draft(&search, &llm, &test_config(), &ctx(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled(Stage::Scouting)));
    assert!(search.recorded_queries().is_empty());
}

#[tokio::test]
async fn reviewer_failure_degrades_to_warning() {
    let search = MockSearch::new(SearchMode::Results);
    let mut llm = MockLlm::new(guides_plan());
    llm.fail_review = true;
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    let warning = draft
        .issues
        .iter()
        .find(|i| i.message.contains("review unavailable"))
        .unwrap();
    assert_eq!(warning.severity, Severity::Warning);
}

#[tokio::test]
async fn unusable_plan_gets_one_corrective_retry() {
    let search = MockSearch::new(SearchMode::Results);
    let mut llm = MockLlm::new(guides_plan());
    llm.bad_first_plan = true;
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(llm.editor_calls.load(Ordering::SeqCst), 2);
    assert_eq!(draft.sections.len(), 2);
}

#[tokio::test]
async fn placeholder_text_triggers_a_revision_pass() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan()).with_section_texts(&[
        "The best crop is [TBD], check back later.",
        DEFAULT_SECTION_TEXT,
        DEFAULT_SECTION_TEXT,
    ]);
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert!(!draft
        .issues
        .iter()
        .any(|i| i.severity == Severity::Error));
    assert!(!draft.markdown.contains("[TBD]"));
    // Two first-pass sections plus one rewrite of the flagged section.
    assert_eq!(llm.text_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn rewrites_see_only_fresh_earlier_summaries() {
    let search = MockSearch::new(SearchMode::Results);
    let llm = MockLlm::new(guides_plan()).with_section_texts(&[
        "Early crops earn [TBD] gold.",
        "Mines open at level [TBD].",
        "Early crops earn steady gold. See [the wiki](https://wiki.example/stardew).",
        DEFAULT_SECTION_TEXT,
    ]);
    let draft = generate_game_article_draft(
        &search,
        &llm,
        &test_config(),
        &ctx(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert!(!draft.markdown.contains("[TBD]"));

    // Two first-pass prompts, then one rewrite per flagged section.
    let prompts = llm.recorded_section_prompts();
    assert_eq!(prompts.len(), 4);

    // The first section's rewrite has no earlier sections to avoid.
    assert!(!prompts[2].contains("Already covered in earlier sections"));

    // The second section's rewrite sees the first section's rewritten
    // summary, not the discarded first-pass text.
    assert!(prompts[3].contains("Early crops earn steady gold"));
    assert!(!prompts[3].contains("[TBD] gold"));
}

#[tokio::test]
async fn scout_briefing_falls_back_to_provider_answers() {
    let search = MockSearch::new(SearchMode::Results);
    let mut llm = MockLlm::new(guides_plan());
    llm.fail_scout = true;

    let registry = StrategyRegistry::new();
    let strategy = registry.get(detect_article_intent(Some("beginner farming tips")));
    let options = GenerationOptions::default();
    let scout = run_scout(&search, &llm, strategy, &test_config(), &ctx(), &options.cancel)
        .await
        .unwrap();

    assert!(
        scout.briefing.overview.contains(PROVIDER_ANSWER),
        "stitched briefing must surface the provider answer, got: {}",
        scout.briefing.overview
    );
}
