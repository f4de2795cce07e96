// Web mentions: pages on the open web that mention an identity.
//
// Backed by the Google Custom Search JSON API when GOOGLE_API_KEY and
// GOOGLE_CSE_ID are both set. Search never fails from the caller's point of
// view: unconfigured or erroring search yields an empty list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::Mention;

use super::{http_client, USER_AGENT};

pub const DEFAULT_GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Custom Search returns at most 10 results per request.
const MAX_RESULTS_PER_REQUEST: usize = 10;

#[async_trait]
pub trait MentionSearch: Send + Sync {
    /// Up to `limit` mentions of `query`. Empty on any failure.
    async fn search(&self, query: &str, limit: usize) -> Vec<Mention>;

    /// Whether this search can return anything at all.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Used when no search backend is configured.
pub struct NoMentions;

#[async_trait]
impl MentionSearch for NoMentions {
    async fn search(&self, _query: &str, _limit: usize) -> Vec<Mention> {
        Vec::new()
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl SearchItem {
    /// Items without a link are useless to the caller and dropped.
    pub fn into_mention(self) -> Option<Mention> {
        let link = self.link?;
        Some(Mention {
            title: self.title.unwrap_or_else(|| link.clone()),
            link,
            snippet: self.snippet,
        })
    }
}

pub struct GoogleSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    cse_id: String,
}

impl GoogleSearchClient {
    pub fn new(base_url: &str, api_key: &str, cse_id: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(USER_AGENT)?,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            cse_id: cse_id.to_string(),
        })
    }

    pub async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<Mention>> {
        let num = limit.clamp(1, MAX_RESULTS_PER_REQUEST).to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .context("Custom Search request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Custom Search returned {}: {}", status, body);
        }

        let body = response
            .json::<SearchResponse>()
            .await
            .context("Failed to parse Custom Search response")?;

        Ok(body
            .items
            .into_iter()
            .filter_map(SearchItem::into_mention)
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl MentionSearch for GoogleSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Vec<Mention> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }
        match self.lookup(query, limit).await {
            Ok(mentions) => {
                debug!(query, found = mentions.len(), "Web mention search complete");
                mentions
            }
            Err(e) => {
                warn!(query, error = format!("{e:#}"), "Web mention search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_mentions_is_empty() {
        assert!(NoMentions.search("alice", 5).await.is_empty());
        assert!(!NoMentions.is_configured());
    }

    #[test]
    fn test_item_without_link_is_dropped() {
        let item = SearchItem {
            title: Some("t".into()),
            link: None,
            snippet: None,
        };
        assert!(item.into_mention().is_none());
    }

    #[test]
    fn test_missing_title_falls_back_to_link() {
        let item = SearchItem {
            title: None,
            link: Some("https://example.com".into()),
            snippet: Some("s".into()),
        };
        let mention = item.into_mention().unwrap();
        assert_eq!(mention.title, "https://example.com");
        assert_eq!(mention.snippet.as_deref(), Some("s"));
    }
}
