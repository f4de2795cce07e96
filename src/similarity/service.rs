// Similarity service: the three identity similarity functions.
//
// Each function has its own fallback policy:
// - usernames: pure fuzzy ratio, 0.0 when either side is missing
// - bios: sentence embeddings when available, otherwise substring-aware
//   fuzzy matching (permanently, after the first embedding failure)
// - avatars: perceptual hash distance, absent when either image can't be had
//
// Usernames use the whole-string ratio and bios the partial ratio. The two
// metrics differ on purpose and are kept separate.

use std::sync::Arc;

use tracing::debug;

use super::embeddings::{cosine_similarity, EmbeddingCapability};
use super::fuzzy;
use super::image::{self, ImageSource};
use crate::models::{clamp_unit, non_blank};

/// Case-insensitive character-level username similarity, 0.0 to 1.0.
///
/// Returns 0.0 if either username is empty or absent. Symmetric.
pub fn compare_usernames(a: Option<&str>, b: Option<&str>) -> f64 {
    match (non_blank(a), non_blank(b)) {
        (Some(a), Some(b)) => clamp_unit(fuzzy::ratio(&a.to_lowercase(), &b.to_lowercase())),
        _ => 0.0,
    }
}

/// Holds the process-wide similarity capabilities: the optional embedding
/// model and the avatar image source.
pub struct SimilarityService {
    embeddings: EmbeddingCapability,
    images: Option<Arc<dyn ImageSource>>,
}

impl SimilarityService {
    /// `images: None` disables avatar comparison entirely.
    pub fn new(embeddings: EmbeddingCapability, images: Option<Arc<dyn ImageSource>>) -> Self {
        Self { embeddings, images }
    }

    /// Fuzzy-only bios, no avatar comparison. Handy for tests and offline use.
    pub fn text_only() -> Self {
        Self::new(EmbeddingCapability::disabled(), None)
    }

    pub fn embeddings(&self) -> &EmbeddingCapability {
        &self.embeddings
    }

    pub fn images_enabled(&self) -> bool {
        self.images.is_some()
    }

    pub fn compare_usernames(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        compare_usernames(a, b)
    }

    /// Bio similarity, 0.0 to 1.0. Returns 0.0 if either bio is empty or
    /// absent, and exactly 1.0 for identical bios on either path.
    pub async fn bio_similarity(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        let (Some(a), Some(b)) = (non_blank(a), non_blank(b)) else {
            return 0.0;
        };
        if a == b {
            return 1.0;
        }

        if let Some(embedder) = self.embeddings.active().await {
            let texts = vec![a.to_string(), b.to_string()];
            match embedder.embed_batch(&texts).await {
                Ok(vectors) if vectors.len() == 2 => {
                    return clamp_unit(cosine_similarity(&vectors[0], &vectors[1]));
                }
                Ok(vectors) => {
                    let reason =
                        anyhow::anyhow!("expected 2 embeddings, got {}", vectors.len());
                    self.embeddings.fall_back(&reason);
                }
                Err(e) => self.embeddings.fall_back(&e),
            }
        }

        let score = clamp_unit(fuzzy::partial_ratio(a, b));
        debug!(score = score, "Fuzzy bio similarity");
        score
    }

    /// Avatar similarity, or `None` when images are disabled, a URL is
    /// missing, or either image fails to load.
    pub async fn image_similarity(&self, url_a: Option<&str>, url_b: Option<&str>) -> Option<f64> {
        let source = self.images.as_deref()?;
        image::image_similarity(source, url_a, url_b)
            .await
            .map(clamp_unit)
    }
}
