// Platform sources: where profiles and web mentions come from.
//
// Each platform client knows how to look up a public profile by username.
// The correlator only ever sees them through the ProfileFetcher trait, so
// the engine can be driven by fakes in tests and new platforms can be added
// without touching it.

pub mod github;
pub mod instagram;
pub mod mentions;
pub mod reddit;
pub mod twitter;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Platform, ProfileRecord, ProfileSet};

/// User-Agent sent by every outbound HTTP client.
pub const USER_AGENT: &str = "memap/0.1 (identity-footprint)";

/// Request timeout for platform and search APIs.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Result of asking one platform about one identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(ProfileRecord),
    /// The platform answered and has no such account.
    NotFound,
    /// Network, auth or parse failure. Treated as absence by the engine.
    TransientError(String),
}

impl FetchOutcome {
    pub fn into_profile(self) -> Option<ProfileRecord> {
        match self {
            FetchOutcome::Found(profile) => Some(profile),
            FetchOutcome::NotFound | FetchOutcome::TransientError(_) => None,
        }
    }

    /// Convert a client lookup result, logging failures.
    pub fn from_lookup(
        platform: Platform,
        identifier: &str,
        result: Result<Option<ProfileRecord>>,
    ) -> Self {
        match result {
            Ok(Some(profile)) => FetchOutcome::Found(profile),
            Ok(None) => {
                debug!(platform = platform.as_str(), identifier, "Profile not found");
                FetchOutcome::NotFound
            }
            Err(e) => {
                warn!(
                    platform = platform.as_str(),
                    identifier,
                    error = format!("{e:#}"),
                    "Profile lookup failed"
                );
                FetchOutcome::TransientError(format!("{e:#}"))
            }
        }
    }
}

/// One platform's profile lookup.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Look up a public profile. Never fails: errors become
    /// `TransientError`.
    async fn fetch(&self, identifier: &str) -> FetchOutcome;
}

/// Fetch `username` from every source concurrently and keep what was found.
pub async fn collect_profiles(fetchers: &[Arc<dyn ProfileFetcher>], username: &str) -> ProfileSet {
    let outcomes = join_all(fetchers.iter().map(|f| f.fetch(username))).await;

    let profiles: ProfileSet = outcomes
        .into_iter()
        .filter_map(FetchOutcome::into_profile)
        .map(|profile| (profile.platform, profile))
        .collect();

    debug!(
        username,
        sources = fetchers.len(),
        found = profiles.len(),
        "Collected profiles"
    );
    profiles
}

/// The platform clients enabled by this configuration. Twitter is only
/// registered when a bearer token is available.
pub fn default_fetchers(config: &Config) -> Result<Vec<Arc<dyn ProfileFetcher>>> {
    let mut fetchers: Vec<Arc<dyn ProfileFetcher>> = vec![
        Arc::new(github::GithubClient::new(
            &config.github_api_url,
            config.github_token.as_deref(),
        )?),
        Arc::new(reddit::RedditClient::new(
            &config.reddit_base_url,
            &config.reddit_user_agent,
        )?),
        Arc::new(instagram::InstagramClient::new(&config.instagram_api_url)?),
    ];

    if let Some(token) = config.twitter_bearer_token.as_deref() {
        fetchers.push(Arc::new(twitter::TwitterClient::new(
            &config.twitter_api_url,
            token,
        )?));
    }

    Ok(fetchers)
}

/// Build a reqwest client with the shared user agent and timeout.
pub(crate) fn http_client(user_agent: &str) -> Result<reqwest::Client> {
    use anyhow::Context;

    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_conversion() {
        let found = FetchOutcome::from_lookup(
            Platform::Github,
            "alice",
            Ok(Some(ProfileRecord::new(Platform::Github, "alice"))),
        );
        assert!(matches!(found, FetchOutcome::Found(_)));

        let missing = FetchOutcome::from_lookup(Platform::Github, "alice", Ok(None));
        assert_eq!(missing, FetchOutcome::NotFound);

        let failed = FetchOutcome::from_lookup(
            Platform::Github,
            "alice",
            Err(anyhow::anyhow!("connection reset")),
        );
        match failed {
            FetchOutcome::TransientError(msg) => assert!(msg.contains("connection reset")),
            other => panic!("expected TransientError, got {other:?}"),
        }
    }

    #[test]
    fn test_only_found_becomes_profile() {
        assert!(FetchOutcome::NotFound.into_profile().is_none());
        assert!(FetchOutcome::TransientError("x".into()).into_profile().is_none());
        assert!(
            FetchOutcome::Found(ProfileRecord::new(Platform::Reddit, "a"))
                .into_profile()
                .is_some()
        );
    }
}
