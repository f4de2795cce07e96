// Avatar fetching and comparison.
//
// `ImageSource` is the fetch-and-decode collaborator. Any failure (network,
// non-2xx status, undecodable bytes) comes back as `None` and the image term
// simply drops out of the impersonation formula. No retries.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use tracing::{debug, warn};

use super::phash::{hash_similarity, perceptual_hash};

/// Fetches and decodes an image from a URL.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, url: &str) -> Option<DynamicImage>;
}

/// Downloads avatars over HTTP and decodes them with the `image` crate.
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::sources::USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<DynamicImage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Avatar request failed: {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Avatar {url} returned {}", response.status());
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read avatar body: {url}"))?;

        image::load_from_memory(&bytes).with_context(|| format!("Failed to decode avatar: {url}"))
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn load(&self, url: &str) -> Option<DynamicImage> {
        match self.fetch(url).await {
            Ok(image) => {
                debug!(url = url, "Fetched avatar");
                Some(image)
            }
            Err(e) => {
                warn!(url = url, error = %e, "Avatar unavailable");
                None
            }
        }
    }
}

/// Perceptual similarity of the images at two URLs.
///
/// `None` if either URL is missing or either image can't be loaded.
pub async fn image_similarity(
    source: &dyn ImageSource,
    url_a: Option<&str>,
    url_b: Option<&str>,
) -> Option<f64> {
    let url_a = url_a.filter(|u| !u.trim().is_empty())?;
    let url_b = url_b.filter(|u| !u.trim().is_empty())?;

    let (image_a, image_b) = tokio::join!(source.load(url_a), source.load(url_b));
    let (image_a, image_b) = (image_a?, image_b?);

    Some(hash_similarity(
        perceptual_hash(&image_a),
        perceptual_hash(&image_b),
    ))
}
