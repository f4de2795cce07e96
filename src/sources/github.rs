// GitHub REST API client: `GET /users/{username}`.
//
// Works unauthenticated (60 requests/hour); a GITHUB_TOKEN raises the limit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::models::{ExtraKey, ExtraValue, Platform, ProfileExtra, ProfileRecord};

use super::{http_client, FetchOutcome, ProfileFetcher, USER_AGENT};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// The subset of the GitHub user object we read.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub location: Option<String>,
    pub html_url: Option<String>,
    pub avatar_url: Option<String>,
    pub public_repos: Option<u64>,
}

impl GithubUser {
    /// Convert to a profile. `requested` is used when `login` is missing.
    pub fn into_profile(self, requested: &str) -> ProfileRecord {
        let username = self.login.unwrap_or_else(|| requested.to_string());
        ProfileRecord {
            platform: Platform::Github,
            username,
            display_name: self.name,
            bio: self.bio,
            followers: self.followers,
            location: self.location,
            profile_url: self.html_url,
            avatar_url: self.avatar_url,
            extra: ProfileExtra::default()
                .with(ExtraKey::PublicRepos, self.public_repos.map(ExtraValue::Count))
                .with(ExtraKey::Following, self.following.map(ExtraValue::Count)),
        }
    }
}

pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: http_client(USER_AGENT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    /// Look up a user. `Ok(None)` on 404 or an empty username.
    pub async fn lookup(&self, username: &str) -> Result<Option<ProfileRecord>> {
        if username.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/users/{}", self.base_url, username);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("GitHub API request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API returned {}: {}", status, body);
        }

        let user = response
            .json::<GithubUser>()
            .await
            .context("Failed to parse GitHub user")?;

        debug!(username, "Fetched GitHub profile");
        Ok(Some(user.into_profile(username)))
    }
}

#[async_trait]
impl ProfileFetcher for GithubClient {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        FetchOutcome::from_lookup(Platform::Github, identifier, self.lookup(identifier).await)
    }
}
