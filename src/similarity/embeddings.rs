// Sentence embeddings for semantic bio comparison using all-MiniLM-L6-v2.
//
// Fuzzy string ratios miss bios that say the same thing in different words
// ("backend engineer, loves Rust" vs "I write servers in Rust"). Embedding
// both bios into 384-dimensional vectors and taking the cosine similarity
// captures that. The model runs locally via ONNX, no API calls.
//
// The capability is optional. `EmbeddingCapability` owns the decision of
// whether it is usable: it loads the model at most once, and after any load
// or inference failure it stays switched off for its whole lifetime so bio
// comparison falls back to fuzzy matching without retrying.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Anything that can turn texts into dense vectors, in input order.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}

type Loader = Arc<dyn Fn() -> Result<Arc<dyn TextEmbedder>> + Send + Sync>;

/// Lazily initialised, optional embedding model shared by all requests.
///
/// Constructed explicitly at startup and handed to the similarity service.
/// Concurrent first callers wait on the same initialisation; the loader runs
/// once whether it succeeds or fails, on the blocking pool since reading a
/// model file and building a session is synchronous work.
pub struct EmbeddingCapability {
    loader: Option<Loader>,
    handle: OnceCell<Option<Arc<dyn TextEmbedder>>>,
    fallen_back: AtomicBool,
}

impl EmbeddingCapability {
    /// No embeddings: bio comparison always uses fuzzy matching.
    pub fn disabled() -> Self {
        Self {
            loader: None,
            handle: OnceCell::new(),
            fallen_back: AtomicBool::new(false),
        }
    }

    /// Load the sentence embedding model from `model_dir` on first use.
    pub fn from_model_dir(model_dir: PathBuf) -> Self {
        Self::with_loader(move || load_sentence_embedder(&model_dir))
    }

    /// Use a custom loader, invoked at most once.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextEmbedder>> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Arc::new(loader)),
            handle: OnceCell::new(),
            fallen_back: AtomicBool::new(false),
        }
    }

    /// Wrap an already constructed embedder.
    pub fn ready(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            loader: None,
            handle: OnceCell::new_with(Some(Some(embedder))),
            fallen_back: AtomicBool::new(false),
        }
    }

    /// Whether embeddings were configured at all (says nothing about whether
    /// the model will load).
    pub fn is_configured(&self) -> bool {
        self.loader.is_some() || self.handle.initialized()
    }

    /// Whether bio comparison has permanently switched to fuzzy matching.
    pub fn has_fallen_back(&self) -> bool {
        self.fallen_back.load(Ordering::Acquire)
    }

    /// The embedder, if configured, loaded, and not yet failed.
    pub async fn active(&self) -> Option<Arc<dyn TextEmbedder>> {
        if self.has_fallen_back() {
            return None;
        }

        let handle = self
            .handle
            .get_or_init(|| async {
                let loader = Arc::clone(self.loader.as_ref()?);
                let loaded = tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|e| anyhow::anyhow!("embedding loader panicked: {e}"))
                    .and_then(|result| result);
                match loaded {
                    Ok(embedder) => {
                        info!("Sentence embedding model loaded");
                        Some(embedder)
                    }
                    Err(e) => {
                        warn!(error = %e, "Embedding model unavailable, using fuzzy bio matching");
                        self.fallen_back.store(true, Ordering::Release);
                        None
                    }
                }
            })
            .await;

        handle.clone()
    }

    /// Permanently switch to fuzzy matching after an inference failure.
    pub fn fall_back(&self, reason: &anyhow::Error) {
        if !self.fallen_back.swap(true, Ordering::AcqRel) {
            warn!(error = %reason, "Embedding inference failed, using fuzzy bio matching from now on");
        }
    }
}

#[cfg(feature = "embeddings")]
fn load_sentence_embedder(model_dir: &std::path::Path) -> Result<Arc<dyn TextEmbedder>> {
    Ok(Arc::new(onnx::SentenceEmbedder::load(model_dir)?))
}

#[cfg(not(feature = "embeddings"))]
fn load_sentence_embedder(model_dir: &std::path::Path) -> Result<Arc<dyn TextEmbedder>> {
    anyhow::bail!(
        "memap was built without the `embeddings` feature; cannot load {}",
        model_dir.display()
    )
}

#[cfg(feature = "embeddings")]
pub use onnx::SentenceEmbedder;

#[cfg(feature = "embeddings")]
mod onnx {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use ort::session::Session;
    use ort::value::Tensor;
    use tokenizers::{Encoding, Tokenizer};
    use tracing::debug;

    use super::{TextEmbedder, EMBEDDING_DIM};

    const MODEL_FILE: &str = "model.onnx";
    const TOKENIZER_FILE: &str = "tokenizer.json";

    /// Embeds profile bios with a local all-MiniLM-L6-v2 model.
    ///
    /// A comparison embeds exactly two bios per call, so the batch is tiny
    /// and padding waste is irrelevant. Bios are short; the tokenizer's own
    /// truncation covers the rare one past the model's window.
    pub struct SentenceEmbedder {
        session: Arc<Mutex<Session>>,
        tokenizer: Arc<Tokenizer>,
    }

    fn require_file(dir: &Path, name: &str) -> Result<std::path::PathBuf> {
        let path = dir.join(name);
        if !path.exists() {
            anyhow::bail!(
                "{} missing from {}; run `memap download-model`",
                name,
                dir.display()
            );
        }
        Ok(path)
    }

    impl SentenceEmbedder {
        /// Open the model and tokenizer in `model_dir`. Synchronous and slow;
        /// the capability calls it from the blocking pool.
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model_path = require_file(model_dir, MODEL_FILE)?;
            let tokenizer_path = require_file(model_dir, TOKENIZER_FILE)?;

            let session = Session::builder()
                .context("ONNX session builder")?
                .commit_from_file(&model_path)
                .with_context(|| format!("loading bio model {}", model_path.display()))?;
            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| anyhow::anyhow!("loading bio tokenizer: {e}"))?;

            debug!(model_dir = %model_dir.display(), "Bio embedding model ready");
            Ok(Self {
                session: Arc::new(Mutex::new(session)),
                tokenizer: Arc::new(tokenizer),
            })
        }
    }

    #[async_trait]
    impl TextEmbedder for SentenceEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let session = Arc::clone(&self.session);
            let tokenizer = Arc::clone(&self.tokenizer);
            let texts = texts.to_vec();

            tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f64>>> {
                let batch = PaddedBatch::encode(&tokenizer, &texts)?;
                let hidden = batch.run(&session)?;
                Ok(batch.mean_pool(&hidden))
            })
            .await
            .context("bio embedding task panicked")?
        }
    }

    /// Token ids and attention mask for a batch, right-padded with id 0 to
    /// the longest sequence. Flattened row-major as `[rows, width]`.
    struct PaddedBatch {
        rows: usize,
        width: usize,
        ids: Vec<i64>,
        mask: Vec<i64>,
    }

    impl PaddedBatch {
        fn encode(tokenizer: &Tokenizer, texts: &[String]) -> Result<Self> {
            let encodings = texts
                .iter()
                .map(|t| {
                    tokenizer
                        .encode(t.as_str(), true)
                        .map_err(|e| anyhow::anyhow!("tokenizing bio: {e}"))
                })
                .collect::<Result<Vec<Encoding>>>()?;

            let rows = encodings.len();
            let width = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
            let mut ids = vec![0i64; rows * width];
            let mut mask = vec![0i64; rows * width];

            for (row, enc) in encodings.iter().enumerate() {
                let start = row * width;
                for (col, (&id, &m)) in enc.get_ids().iter().zip(enc.get_attention_mask()).enumerate() {
                    ids[start + col] = i64::from(id);
                    mask[start + col] = i64::from(m);
                }
            }

            Ok(Self { rows, width, ids, mask })
        }

        /// Run the model. Returns `last_hidden_state` flattened as
        /// `[rows, width, EMBEDDING_DIM]`.
        fn run(&self, session: &Mutex<Session>) -> Result<Vec<f32>> {
            if self.width == 0 {
                return Ok(Vec::new());
            }
            let shape = [self.rows as i64, self.width as i64];
            let ids = Tensor::from_array((shape, self.ids.clone())).context("input_ids tensor")?;
            let mask = Tensor::from_array((shape, self.mask.clone())).context("attention_mask tensor")?;
            let types = Tensor::from_array((shape, vec![0i64; self.rows * self.width]))
                .context("token_type_ids tensor")?;

            let mut session = session
                .lock()
                .map_err(|e| anyhow::anyhow!("bio model session poisoned: {e}"))?;
            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => ids,
                    "attention_mask" => mask,
                    "token_type_ids" => types
                })
                .context("bio model inference")?;
            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("reading bio model output")?;
            Ok(data.to_vec())
        }

        /// Average each row's token vectors over its unmasked positions.
        /// A row with no tokens stays the zero vector, which cosine scores 0.
        fn mean_pool(&self, hidden: &[f32]) -> Vec<Vec<f64>> {
            (0..self.rows)
                .map(|row| {
                    let mut pooled = vec![0.0_f64; EMBEDDING_DIM];
                    let mut tokens = 0.0_f64;
                    for col in (0..self.width).filter(|&c| self.mask[row * self.width + c] > 0) {
                        let offset = (row * self.width + col) * EMBEDDING_DIM;
                        let Some(token) = hidden.get(offset..offset + EMBEDDING_DIM) else {
                            break;
                        };
                        for (slot, &v) in pooled.iter_mut().zip(token) {
                            *slot += f64::from(v);
                        }
                        tokens += 1.0;
                    }
                    if tokens > 0.0 {
                        pooled.iter_mut().for_each(|v| *v /= tokens);
                    }
                    pooled
                })
                .collect()
        }
    }
}

/// Rounding slack below 1.0 that still counts as parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Cosine similarity between two embedding vectors, clamped to 0.0-1.0.
///
/// Mismatched or empty vectors, and zero vectors, score 0.0. Parallel
/// vectors score exactly 1.0: `sqrt(s) * sqrt(s)` is not always `s`, and a
/// result one ulp short of 1.0 would drop out of the top tier.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        return 0.0;
    }

    let sim = dot / denom;
    if sim > 1.0 - PARALLEL_EPSILON {
        1.0
    } else {
        sim.clamp(0.0, 1.0)
    }
}
