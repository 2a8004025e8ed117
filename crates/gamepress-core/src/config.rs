use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which is useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
///
/// No variable is strictly required: provider keys are optional by design
/// (missing keys degrade the pipeline rather than aborting startup).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("GAMEPRESS_ENV", "development"));
    let log_level = or_default("GAMEPRESS_LOG_LEVEL", "info");

    let search_api_key = lookup("TAVILY_API_KEY").ok();
    let search_base_url = or_default("GAMEPRESS_SEARCH_BASE_URL", "https://api.tavily.com");
    let search_timeout_secs = parse_u64("GAMEPRESS_SEARCH_TIMEOUT_SECS", "20")?;
    let search_max_results = parse_usize("GAMEPRESS_SEARCH_MAX_RESULTS", "5")?;

    let llm_api_key = lookup("GAMEPRESS_LLM_API_KEY").ok();
    let llm_base_url = or_default("GAMEPRESS_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("GAMEPRESS_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_u64("GAMEPRESS_LLM_TIMEOUT_SECS", "120")?;
    let llm_max_retries = parse_u32("GAMEPRESS_LLM_MAX_RETRIES", "1")?;
    let llm_retry_backoff_base_ms = parse_u64("GAMEPRESS_LLM_RETRY_BACKOFF_BASE_MS", "500")?;

    let section_top_results = parse_usize("GAMEPRESS_SECTION_TOP_RESULTS", "3")?;
    let section_result_char_budget = parse_usize("GAMEPRESS_SECTION_RESULT_CHAR_BUDGET", "1200")?;
    let max_revision_attempts = parse_u32("GAMEPRESS_MAX_REVISION_ATTEMPTS", "2")?;

    Ok(AppConfig {
        env,
        log_level,
        search_api_key,
        search_base_url,
        search_timeout_secs,
        search_max_results,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        llm_max_retries,
        llm_retry_backoff_base_ms,
        section_top_results,
        section_result_char_budget,
        max_revision_attempts,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("empty env should be valid");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.search_api_key.is_none());
        assert!(cfg.llm_api_key.is_none());
        assert_eq!(cfg.search_base_url, "https://api.tavily.com");
        assert_eq!(cfg.search_timeout_secs, 20);
        assert_eq!(cfg.search_max_results, 5);
        assert_eq!(cfg.llm_base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.llm_model, "gpt-4o-mini");
        assert_eq!(cfg.llm_timeout_secs, 120);
        assert_eq!(cfg.llm_max_retries, 1);
        assert_eq!(cfg.llm_retry_backoff_base_ms, 500);
        assert_eq!(cfg.section_top_results, 3);
        assert_eq!(cfg.section_result_char_budget, 1200);
        assert_eq!(cfg.max_revision_attempts, 2);
    }

    #[test]
    fn build_app_config_reads_provider_keys() {
        let mut map = HashMap::new();
        map.insert("TAVILY_API_KEY", "tvly-secret");
        map.insert("GAMEPRESS_LLM_API_KEY", "sk-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.search_api_key.as_deref(), Some("tvly-secret"));
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-secret"));
    }

    #[test]
    fn build_app_config_overrides_numeric_values() {
        let mut map = HashMap::new();
        map.insert("GAMEPRESS_SECTION_TOP_RESULTS", "5");
        map.insert("GAMEPRESS_MAX_REVISION_ATTEMPTS", "1");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.section_top_results, 5);
        assert_eq!(cfg.max_revision_attempts, 1);
    }

    #[test]
    fn build_app_config_rejects_invalid_numbers() {
        let mut map = HashMap::new();
        map.insert("GAMEPRESS_LLM_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GAMEPRESS_LLM_TIMEOUT_SECS"),
            "expected InvalidEnvVar(GAMEPRESS_LLM_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn debug_output_redacts_keys() {
        let mut map = HashMap::new();
        map.insert("TAVILY_API_KEY", "tvly-secret");
        map.insert("GAMEPRESS_LLM_API_KEY", "sk-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("tvly-secret"), "search key leaked: {debug}");
        assert!(!debug.contains("sk-secret"), "llm key leaked: {debug}");
    }
}
