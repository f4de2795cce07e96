// The correlator: the two request-scoped operations behind every surface.
//
// footprint: who is this identity across platforms, and how exposed are they?
// compare:   how likely is it that identity B is impersonating identity A?
//
// Both validate their input before touching the network. After validation
// nothing can fail: unavailable sources, missing fields and a broken
// embedding model all degrade to absent or zero-valued terms.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::candidates::DEFAULT_MAX_CANDIDATES;
use crate::config::{Config, DEFAULT_MENTION_LIMIT};
use crate::error::CorrelationError;
use crate::graph::compare::pairwise_graph;
use crate::graph::expansion::{expansion_graph, ExpansionLimits};
use crate::graph::footprint::single_identity_graph;
use crate::graph::GraphResponse;
use crate::models::{ExposureMetrics, ImpersonationAssessment, Mention, Platform};
use crate::scoring::impersonation::{
    self, compare_platforms, ImpersonationWeights, PlatformComparison, DEFAULT_ANCHOR_PLATFORM,
};
use crate::similarity::download::embedding_model_dir;
use crate::similarity::embeddings::EmbeddingCapability;
use crate::similarity::image::{HttpImageSource, ImageSource};
use crate::similarity::SimilarityService;
use crate::sources::mentions::{GoogleSearchClient, MentionSearch, NoMentions};
use crate::sources::{collect_profiles, default_fetchers, ProfileFetcher};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_PER_PLATFORM: usize = 5;
pub const LIMIT_RANGE: RangeInclusive<usize> = 1..=25;
pub const PER_PLATFORM_RANGE: RangeInclusive<usize> = 1..=10;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_per_platform() -> usize {
    DEFAULT_PER_PLATFORM
}

/// Parameters of a footprint request. Deserializable straight from a query
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Total cap on platform nodes (name expansion only)
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Cap on nodes per platform
    #[serde(default = "default_per_platform")]
    pub per_platform: usize,
}

impl FootprintRequest {
    pub fn for_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            full_name: None,
            limit: DEFAULT_LIMIT,
            per_platform: DEFAULT_PER_PLATFORM,
        }
    }

    pub fn for_full_name(full_name: impl Into<String>) -> Self {
        Self {
            username: None,
            full_name: Some(full_name.into()),
            limit: DEFAULT_LIMIT,
            per_platform: DEFAULT_PER_PLATFORM,
        }
    }

    /// Resolve what to search for, rejecting invalid requests.
    /// A username wins over a full name when both are given.
    pub fn target(&self) -> Result<FootprintTarget, CorrelationError> {
        let username = trimmed(self.username.as_deref());
        let full_name = trimmed(self.full_name.as_deref());

        let target = match (username, full_name) {
            (Some(u), _) => FootprintTarget::Username(u.to_string()),
            (None, Some(n)) => FootprintTarget::FullName(n.to_string()),
            (None, None) => {
                return Err(CorrelationError::invalid("username or full_name is required"))
            }
        };

        if !LIMIT_RANGE.contains(&self.limit) {
            return Err(CorrelationError::invalid(format!(
                "limit must be between {} and {}",
                LIMIT_RANGE.start(),
                LIMIT_RANGE.end()
            )));
        }
        if !PER_PLATFORM_RANGE.contains(&self.per_platform) {
            return Err(CorrelationError::invalid(format!(
                "per_platform must be between {} and {}",
                PER_PLATFORM_RANGE.start(),
                PER_PLATFORM_RANGE.end()
            )));
        }

        Ok(target)
    }
}

/// A validated footprint search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FootprintTarget {
    Username(String),
    FullName(String),
}

impl FootprintTarget {
    pub fn label(&self) -> &str {
        match self {
            FootprintTarget::Username(u) => u,
            FootprintTarget::FullName(n) => n,
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize)]
pub struct FootprintReport {
    /// The center label: the username or full name searched for.
    pub query: String,
    #[serde(flatten)]
    pub graph: GraphResponse,
    pub exposure: ExposureMetrics,
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub user_a: String,
    pub user_b: String,
    #[serde(flatten)]
    pub graph: GraphResponse,
    pub assessment: ImpersonationAssessment,
    /// Per-platform scores, for platforms both identities are on.
    pub composite_scores: BTreeMap<Platform, PlatformComparison>,
    pub insights: Vec<String>,
}

/// Tunables of the correlator.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatorSettings {
    pub max_candidates: usize,
    pub mention_limit: usize,
    /// Avatar fallback platform for comparisons
    pub anchor: Platform,
    pub weights: ImpersonationWeights,
}

impl Default for CorrelatorSettings {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            mention_limit: DEFAULT_MENTION_LIMIT,
            anchor: DEFAULT_ANCHOR_PLATFORM,
            weights: ImpersonationWeights::default(),
        }
    }
}

pub struct Correlator {
    fetchers: Vec<Arc<dyn ProfileFetcher>>,
    mentions: Arc<dyn MentionSearch>,
    similarity: Arc<SimilarityService>,
    settings: CorrelatorSettings,
}

impl Correlator {
    pub fn new(
        fetchers: Vec<Arc<dyn ProfileFetcher>>,
        mentions: Arc<dyn MentionSearch>,
        similarity: Arc<SimilarityService>,
    ) -> Self {
        Self {
            fetchers,
            mentions,
            similarity,
            settings: CorrelatorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CorrelatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Wire up the real platform clients, search and similarity service.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetchers = default_fetchers(config)?;

        let mentions: Arc<dyn MentionSearch> = match config.google_credentials() {
            Some((key, cse)) => Arc::new(GoogleSearchClient::new(&config.google_cse_url, key, cse)?),
            None => Arc::new(NoMentions),
        };

        let embeddings = if config.enable_embeddings {
            EmbeddingCapability::from_model_dir(embedding_model_dir(&config.model_dir))
        } else {
            EmbeddingCapability::disabled()
        };
        let images: Option<Arc<dyn ImageSource>> = if config.enable_image_similarity {
            Some(Arc::new(HttpImageSource::new()?))
        } else {
            None
        };

        let settings = CorrelatorSettings {
            max_candidates: config.max_candidates,
            mention_limit: config.mention_limit,
            ..CorrelatorSettings::default()
        };

        Ok(Self::new(
            fetchers,
            mentions,
            Arc::new(SimilarityService::new(embeddings, images)),
        )
        .with_settings(settings))
    }

    pub fn fetchers(&self) -> &[Arc<dyn ProfileFetcher>] {
        &self.fetchers
    }

    pub fn similarity(&self) -> &SimilarityService {
        &self.similarity
    }

    pub fn settings(&self) -> &CorrelatorSettings {
        &self.settings
    }

    /// Map one identity's digital footprint.
    pub async fn footprint(
        &self,
        request: &FootprintRequest,
    ) -> Result<FootprintReport, CorrelationError> {
        let target = request.target()?;
        let label = target.label();

        let graph_task = async {
            match &target {
                FootprintTarget::Username(username) => {
                    let profiles = collect_profiles(&self.fetchers, username).await;
                    single_identity_graph(label, &profiles, request.per_platform)
                }
                FootprintTarget::FullName(full_name) => {
                    let limits = ExpansionLimits {
                        total: request.limit,
                        per_platform: request.per_platform,
                        max_candidates: self.settings.max_candidates,
                    };
                    expansion_graph(full_name, &self.fetchers, limits).await
                }
            }
        };
        let mentions_task = self.mentions.search(label, self.settings.mention_limit);

        let (graph, mentions) = tokio::join!(graph_task, mentions_task);
        let exposure = ExposureMetrics::from_counts(graph.platform_node_count(), mentions.len());

        info!(
            query = label,
            profiles = exposure.profile_count,
            mentions = exposure.mention_count,
            exposure_index = exposure.exposure_index,
            "Footprint complete"
        );

        Ok(FootprintReport {
            query: label.to_string(),
            graph,
            exposure,
            mentions,
        })
    }

    /// Compare two identities for impersonation.
    pub async fn compare(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<ComparisonReport, CorrelationError> {
        let (Some(user_a), Some(user_b)) = (trimmed(Some(user_a)), trimmed(Some(user_b))) else {
            return Err(CorrelationError::invalid("user_a and user_b are required"));
        };

        let (profiles_a, profiles_b) = tokio::join!(
            collect_profiles(&self.fetchers, user_a),
            collect_profiles(&self.fetchers, user_b)
        );

        let comparisons = compare_platforms(&self.similarity, &profiles_a, &profiles_b).await;
        let assessment = impersonation::assess(
            &self.similarity,
            user_a,
            user_b,
            &profiles_a,
            &profiles_b,
            &comparisons,
            self.settings.anchor,
            &self.settings.weights,
        )
        .await;

        let graph = pairwise_graph(user_a, user_b, &profiles_a, &profiles_b, &comparisons);

        Ok(ComparisonReport {
            user_a: user_a.to_string(),
            user_b: user_b.to_string(),
            graph,
            insights: impersonation::insights(&assessment),
            assessment,
            composite_scores: comparisons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_wins_over_full_name() {
        let request = FootprintRequest {
            username: Some(" alice ".into()),
            full_name: Some("Alice Smith".into()),
            limit: 10,
            per_platform: 5,
        };
        assert_eq!(
            request.target().unwrap(),
            FootprintTarget::Username("alice".into())
        );
    }

    #[test]
    fn test_blank_username_falls_through_to_full_name() {
        let request = FootprintRequest {
            username: Some("   ".into()),
            ..FootprintRequest::for_full_name("Jane Doe")
        };
        assert_eq!(
            request.target().unwrap(),
            FootprintTarget::FullName("Jane Doe".into())
        );
    }

    #[test]
    fn test_missing_identifiers_rejected() {
        let request = FootprintRequest {
            username: None,
            full_name: Some("  ".into()),
            limit: 10,
            per_platform: 5,
        };
        assert_eq!(
            request.target(),
            Err(CorrelationError::invalid("username or full_name is required"))
        );
    }

    #[test]
    fn test_limit_bounds() {
        let mut request = FootprintRequest::for_username("alice");
        request.limit = 0;
        assert!(request.target().is_err());
        request.limit = 26;
        assert!(request.target().is_err());
        request.limit = 25;
        assert!(request.target().is_ok());
        request.limit = 1;
        assert!(request.target().is_ok());
    }

    #[test]
    fn test_per_platform_bounds() {
        let mut request = FootprintRequest::for_username("alice");
        request.per_platform = 0;
        assert!(request.target().is_err());
        request.per_platform = 11;
        assert!(request.target().is_err());
        request.per_platform = 10;
        assert!(request.target().is_ok());
    }

    #[test]
    fn test_query_string_defaults() {
        let request: FootprintRequest = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert_eq!(request.limit, DEFAULT_LIMIT);
        assert_eq!(request.per_platform, DEFAULT_PER_PLATFORM);
        assert!(request.full_name.is_none());
    }
}
