// Instagram public profile client.
//
// Uses the same web_profile_info endpoint the Instagram web app calls. It
// needs the web app id header and is aggressively rate limited for
// anonymous callers, so a 401/429 here is common and just means "no data".

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::models::{non_blank, ExtraKey, ExtraValue, Platform, ProfileExtra, ProfileRecord};

use super::{http_client, FetchOutcome, ProfileFetcher, USER_AGENT};

pub const DEFAULT_INSTAGRAM_API_URL: &str = "https://i.instagram.com";

/// App id of the Instagram web client.
const IG_APP_ID: &str = "936619743392459";

#[derive(Debug, Clone, Deserialize)]
pub struct WebProfileInfo {
    pub data: Option<WebProfileData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebProfileData {
    pub user: Option<InstagramUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramUser {
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_verified: Option<bool>,
    pub edge_followed_by: Option<EdgeCount>,
    pub edge_owner_to_timeline_media: Option<EdgeCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeCount {
    pub count: u64,
}

impl InstagramUser {
    pub fn into_profile(self) -> ProfileRecord {
        let display_name = non_blank(self.full_name.as_deref())
            .unwrap_or(&self.username)
            .to_string();

        ProfileRecord {
            platform: Platform::Instagram,
            display_name: Some(display_name),
            bio: non_blank(self.biography.as_deref()).map(str::to_string),
            followers: self.edge_followed_by.map(|e| e.count),
            location: None,
            profile_url: Some(format!("https://instagram.com/{}", self.username)),
            avatar_url: self.profile_pic_url,
            extra: ProfileExtra::default()
                .with(ExtraKey::Verified, self.is_verified.map(ExtraValue::Flag))
                .with(
                    ExtraKey::Posts,
                    self.edge_owner_to_timeline_media.map(|e| ExtraValue::Count(e.count)),
                ),
            username: self.username,
        }
    }
}

pub struct InstagramClient {
    client: reqwest::Client,
    base_url: String,
}

impl InstagramClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(USER_AGENT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn lookup(&self, username: &str) -> Result<Option<ProfileRecord>> {
        if username.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/api/v1/users/web_profile_info/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("username", username)])
            .header("x-ig-app-id", IG_APP_ID)
            .send()
            .await
            .context("Instagram API request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Instagram API returned {}: {}", status, body);
        }

        let info = response
            .json::<WebProfileInfo>()
            .await
            .context("Failed to parse Instagram profile")?;

        let Some(user) = info.data.and_then(|d| d.user) else {
            return Ok(None);
        };

        debug!(username, "Fetched Instagram profile");
        Ok(Some(user.into_profile()))
    }
}

#[async_trait]
impl ProfileFetcher for InstagramClient {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        FetchOutcome::from_lookup(Platform::Instagram, identifier, self.lookup(identifier).await)
    }
}
