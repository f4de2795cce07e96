// Twitter (X) API v2 client: user lookup by username.
//
// Requires a bearer token; without one the client is never registered.
// A leading "@" is stripped. If the query contains whitespace (someone typed
// a display name), the compacted form is tried through the batch
// `/users/by?usernames=` endpoint as a fallback.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::models::{ExtraKey, ExtraValue, Platform, ProfileExtra, ProfileRecord};

use super::{http_client, FetchOutcome, ProfileFetcher, USER_AGENT};

pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com/2";

const USER_FIELDS: &str = "name,username,description,public_metrics,profile_image_url,verified";

#[derive(Debug, Clone, Deserialize)]
pub struct SingleUserResponse {
    pub data: Option<TwitterUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultiUserResponse {
    #[serde(default)]
    pub data: Vec<TwitterUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub username: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub profile_image_url: Option<String>,
    pub verified: Option<bool>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicMetrics {
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub tweet_count: Option<u64>,
}

impl TwitterUser {
    pub fn into_profile(self) -> ProfileRecord {
        let metrics = self.public_metrics.unwrap_or_default();
        ProfileRecord {
            platform: Platform::Twitter,
            display_name: self.name,
            bio: self.description,
            followers: metrics.followers_count,
            location: None,
            profile_url: Some(format!("https://twitter.com/{}", self.username)),
            avatar_url: self.profile_image_url,
            extra: ProfileExtra::default()
                .with(ExtraKey::Following, metrics.following_count.map(ExtraValue::Count))
                .with(ExtraKey::Posts, metrics.tweet_count.map(ExtraValue::Count))
                .with(ExtraKey::Verified, self.verified.map(ExtraValue::Flag)),
            username: self.username,
        }
    }
}

pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl TwitterClient {
    pub fn new(base_url: &str, bearer_token: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(USER_AGENT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
        })
    }

    pub async fn lookup(&self, query: &str) -> Result<Option<ProfileRecord>> {
        let username = query.trim().trim_start_matches('@');
        if username.is_empty() {
            return Ok(None);
        }

        let compact: String = username.split_whitespace().collect();
        if compact != username {
            return self.lookup_many(&compact).await;
        }

        let url = format!("{}/users/by/username/{}", self.base_url, username);
        let Some(body) = self.get_json::<SingleUserResponse>(&url, &[]).await? else {
            return Ok(None);
        };

        debug!(username, found = body.data.is_some(), "Twitter user lookup");
        Ok(body.data.map(TwitterUser::into_profile))
    }

    async fn lookup_many(&self, usernames: &str) -> Result<Option<ProfileRecord>> {
        let url = format!("{}/users/by", self.base_url);
        let Some(body) = self
            .get_json::<MultiUserResponse>(&url, &[("usernames", usernames)])
            .await?
        else {
            return Ok(None);
        };

        debug!(usernames, found = body.data.len(), "Twitter batch lookup");
        Ok(body.data.into_iter().next().map(TwitterUser::into_profile))
    }

    /// GET with the bearer token. `Ok(None)` on 404.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .query(params)
            .query(&[("user.fields", USER_FIELDS)])
            .send()
            .await
            .context("Twitter API request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Twitter API returned {}: {}", status, body);
        }

        let body = response
            .json::<T>()
            .await
            .context("Failed to parse Twitter response")?;
        Ok(Some(body))
    }
}

#[async_trait]
impl ProfileFetcher for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        FetchOutcome::from_lookup(Platform::Twitter, identifier, self.lookup(identifier).await)
    }
}
