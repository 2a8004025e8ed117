//! Shared domain types and configuration for the gamepress workspace.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod context;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use context::{ArticleCategory, ArticleIntent, GameArticleContext};

/// Configuration failures. Every setting has a default or is optional, so
/// the only way to fail is an unparseable override.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
