use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;

use gamepress_core::{load_app_config, GameArticleContext};
use gamepress_llm::LlmClient;
use gamepress_pipeline::{
    generate_game_article_draft, GenerationOptions, GenerationPhase, ProgressCallback, Severity,
};
use gamepress_search::TavilyClient;

#[derive(Debug, Parser)]
#[command(name = "gamepress")]
#[command(about = "Research-driven article generation for gaming wikis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate one article draft.
    Generate {
        /// Game the article is about.
        #[arg(long)]
        game: String,

        /// Free-text focus, e.g. "beginner farming tips".
        #[arg(long)]
        instruction: Option<String>,

        /// Genre tag; repeat for multiple.
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Platform; repeat for multiple.
        #[arg(long = "platform")]
        platforms: Vec<String>,

        /// Release date, YYYY-MM-DD.
        #[arg(long)]
        release_date: Option<NaiveDate>,

        #[arg(long)]
        developer: Option<String>,

        #[arg(long)]
        publisher: Option<String>,

        /// Cap on revision passes, overriding the configured default.
        #[arg(long)]
        max_revisions: Option<u32>,

        /// Emit the full draft as JSON instead of markdown.
        #[arg(long)]
        json: bool,

        /// Print phase transitions as they happen.
        #[arg(long)]
        progress: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            game,
            instruction,
            genres,
            platforms,
            release_date,
            developer,
            publisher,
            max_revisions,
            json,
            progress,
        } => {
            let config = load_app_config().context("loading configuration")?;

            let search = TavilyClient::with_base_url(
                config.search_api_key.as_deref(),
                config.search_timeout_secs,
                &config.search_base_url,
            )
            .context("building search client")?;
            if config.search_api_key.is_none() {
                warn!("TAVILY_API_KEY not set, research will be empty");
            }

            let llm = LlmClient::with_base_url(
                config.llm_api_key.as_deref(),
                &config.llm_model,
                config.llm_timeout_secs,
                config.llm_max_retries,
                config.llm_retry_backoff_base_ms,
                &config.llm_base_url,
            )
            .context("building LLM client")?;

            let mut ctx = GameArticleContext::new(&game);
            if let Some(instruction) = instruction {
                ctx = ctx.with_instruction(&instruction);
            }
            ctx.genres = genres;
            ctx.platforms = platforms;
            ctx.release_date = release_date;
            ctx.developer = developer;
            ctx.publisher = publisher;

            let mut options = GenerationOptions {
                max_revision_attempts: max_revisions,
                ..GenerationOptions::default()
            };
            if progress {
                let callback: ProgressCallback = Arc::new(|phase: GenerationPhase| {
                    eprintln!("[gamepress] {phase}");
                });
                options.progress = Some(callback);
            }

            // Ctrl-C cancels at the next stage boundary instead of killing
            // the process mid-request.
            let cancel = options.cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling generation");
                    cancel.cancel();
                }
            });

            let draft = generate_game_article_draft(&search, &llm, &config, &ctx, &options)
                .await
                .context("generating article")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&draft)?);
            } else {
                println!("# {}\n", draft.title);
                println!("> {}\n", draft.excerpt);
                println!("{}\n", draft.markdown);
                eprintln!(
                    "category: {}  confidence: {}  tokens: {}",
                    draft.category.as_slug(),
                    draft.confidence.as_str(),
                    draft.usage.total()
                );
                for issue in &draft.issues {
                    let tag = match issue.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                    };
                    match &issue.location {
                        Some(location) => {
                            eprintln!("{tag} ({location}): {}", issue.message);
                        }
                        None => eprintln!("{tag}: {}", issue.message),
                    }
                }
            }
        }
    }

    Ok(())
}
