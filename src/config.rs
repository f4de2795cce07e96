use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::candidates::DEFAULT_MAX_CANDIDATES;
use crate::sources::{github, instagram, mentions, reddit, twitter};

/// Default number of web mentions fetched per footprint.
pub const DEFAULT_MENTION_LIMIT: usize = 5;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy. Every source works
/// without credentials except Twitter and web mentions, which are simply
/// skipped when unconfigured.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional GitHub token, raises the unauthenticated rate limit
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub reddit_base_url: String,
    /// Reddit rejects generic user agents, so this is configurable
    pub reddit_user_agent: String,
    pub instagram_api_url: String,
    /// Twitter API v2 bearer token. Twitter is skipped when unset.
    pub twitter_bearer_token: Option<String>,
    pub twitter_api_url: String,
    /// Google Custom Search credentials. Web mentions are skipped unless both are set.
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub google_cse_url: String,
    /// Use the local sentence embedding model for bio similarity (default: false)
    pub enable_embeddings: bool,
    /// Directory containing the embedding model files
    pub model_dir: PathBuf,
    /// Fetch and hash avatars during comparisons (default: true)
    pub enable_image_similarity: bool,
    /// Candidate handles probed per name expansion
    pub max_candidates: usize,
    /// Web mentions fetched per footprint
    pub mention_limit: usize,
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Case-insensitive boolean: `TRUE`, `Yes` and `on` all count.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|raw| parse_flag(&raw))
        .unwrap_or(default)
}

fn number(key: &str, default: usize) -> Result<usize> {
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer, got {raw:?}")),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("MEMAP_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::similarity::download::default_model_dir());

        Ok(Self {
            github_token: optional("GITHUB_TOKEN"),
            github_api_url: optional("GITHUB_API_URL")
                .unwrap_or_else(|| github::DEFAULT_GITHUB_API_URL.to_string()),
            reddit_base_url: optional("REDDIT_BASE_URL")
                .unwrap_or_else(|| reddit::DEFAULT_REDDIT_BASE_URL.to_string()),
            reddit_user_agent: optional("REDDIT_USER_AGENT")
                .unwrap_or_else(|| reddit::DEFAULT_REDDIT_USER_AGENT.to_string()),
            instagram_api_url: optional("INSTAGRAM_API_URL")
                .unwrap_or_else(|| instagram::DEFAULT_INSTAGRAM_API_URL.to_string()),
            twitter_bearer_token: optional("TWITTER_BEARER_TOKEN"),
            twitter_api_url: optional("TWITTER_API_URL")
                .unwrap_or_else(|| twitter::DEFAULT_TWITTER_API_URL.to_string()),
            google_api_key: optional("GOOGLE_API_KEY"),
            google_cse_id: optional("GOOGLE_CSE_ID"),
            google_cse_url: optional("GOOGLE_CSE_URL")
                .unwrap_or_else(|| mentions::DEFAULT_GOOGLE_CSE_URL.to_string()),
            enable_embeddings: flag("ENABLE_EMBEDDINGS", false),
            model_dir,
            enable_image_similarity: flag("ENABLE_IMAGE_SIMILARITY", true),
            max_candidates: number("MEMAP_MAX_CANDIDATES", DEFAULT_MAX_CANDIDATES)?,
            mention_limit: number("MEMAP_MENTION_LIMIT", DEFAULT_MENTION_LIMIT)?,
        })
    }

    /// Both Custom Search credentials, if configured.
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        Some((self.google_api_key.as_deref()?, self.google_cse_id.as_deref()?))
    }

    /// Warn up front when embeddings are on but the model files are missing.
    /// Bio comparison still runs, on fuzzy matching.
    pub fn warn_if_embedding_model_missing(&self) {
        if self.enable_embeddings
            && !crate::similarity::download::embedding_files_present(&self.model_dir)
        {
            tracing::warn!(
                model_dir = %self.model_dir.display(),
                "Embedding model files not found, run `memap download-model` or set ENABLE_EMBEDDINGS=false"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_ignores_case() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("OFF"), Some(false));
    }

    #[test]
    fn test_unknown_flag_uses_default() {
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
        assert!(flag("MEMAP_TEST_FLAG_NEVER_SET", true));
        assert!(!flag("MEMAP_TEST_FLAG_NEVER_SET", false));
    }
}
