// Reddit public profile client: `GET /user/{username}/about.json`.
//
// No OAuth app needed: the public JSON endpoint exposes the same fields we
// use (profile subreddit description and subscriber count, icon, karma).
// Suspended accounts come back as 200 with `is_suspended` set and are
// treated as not found.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::models::{non_blank, ExtraKey, ExtraValue, Platform, ProfileExtra, ProfileRecord};

use super::{http_client, FetchOutcome, ProfileFetcher};

pub const DEFAULT_REDDIT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_REDDIT_USER_AGENT: &str = "memap/0.1 (identity-footprint)";

#[derive(Debug, Clone, Deserialize)]
pub struct RedditAbout {
    pub data: Option<RedditUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditUser {
    pub name: String,
    #[serde(default)]
    pub is_suspended: bool,
    pub icon_img: Option<String>,
    /// Either karma total can be negative
    pub link_karma: Option<i64>,
    pub comment_karma: Option<i64>,
    pub subreddit: Option<RedditProfileSubreddit>,
}

/// The user's profile subreddit (`u_{name}`), which carries the bio.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditProfileSubreddit {
    pub public_description: Option<String>,
    pub subscribers: Option<u64>,
}

impl RedditUser {
    pub fn into_profile(self, base_url: &str) -> ProfileRecord {
        let karma = match (self.link_karma, self.comment_karma) {
            (None, None) => None,
            (link, comment) => Some(link.unwrap_or(0).saturating_add(comment.unwrap_or(0))),
        };
        let (bio, followers) = match self.subreddit {
            Some(sub) => (sub.public_description, sub.subscribers),
            None => (None, None),
        };
        // Reddit HTML-escapes query strings inside icon URLs
        let avatar_url = non_blank(self.icon_img.as_deref()).map(|url| url.replace("&amp;", "&"));

        ProfileRecord {
            platform: Platform::Reddit,
            display_name: Some(format!("u/{}", self.name)),
            bio: non_blank(bio.as_deref()).map(str::to_string),
            followers,
            location: None,
            profile_url: Some(format!("{}/user/{}", base_url, self.name)),
            avatar_url,
            extra: ProfileExtra::default().with(ExtraKey::Karma, karma.map(ExtraValue::Score)),
            username: self.name,
        }
    }
}

pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
}

impl RedditClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn lookup(&self, username: &str) -> Result<Option<ProfileRecord>> {
        if username.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/user/{}/about.json", self.base_url, username);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Reddit API request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit API returned {}: {}", status, body);
        }

        let about = response
            .json::<RedditAbout>()
            .await
            .context("Failed to parse Reddit profile")?;

        let Some(user) = about.data.filter(|u| !u.is_suspended) else {
            return Ok(None);
        };

        debug!(username, "Fetched Reddit profile");
        Ok(Some(user.into_profile(&self.base_url)))
    }
}

#[async_trait]
impl ProfileFetcher for RedditClient {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        FetchOutcome::from_lookup(Platform::Reddit, identifier, self.lookup(identifier).await)
    }
}
