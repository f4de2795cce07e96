// Data models: the types that flow through the correlation engine.
//
// Profiles come in from the platform fetchers, similarity and scoring turn
// them into assessments, and the graph builder turns both into a response.
// Everything here lives for a single request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A public platform we can look identities up on.
///
/// Declaration order matters: it is the order profiles are collected in and
/// the iteration order of every per-platform map (`ProfileSet`, composite
/// scores). GitHub comes first because it is the most structured source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Github,
    Reddit,
    Instagram,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Github,
        Platform::Reddit,
        Platform::Instagram,
        Platform::Twitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Github => "github",
            Platform::Reddit => "reddit",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
        }
    }

    /// Human-facing name for terminal output.
    pub fn title(&self) -> &'static str {
        match self {
            Platform::Github => "GitHub",
            Platform::Reddit => "Reddit",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys allowed in a profile's extra metadata.
///
/// | key            | platforms          | value  |
/// |----------------|--------------------|--------|
/// | `public_repos` | github             | count  |
/// | `following`    | github, twitter    | count  |
/// | `karma`        | reddit             | score  |
/// | `posts`        | instagram, twitter | count  |
/// | `verified`     | instagram, twitter | flag   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKey {
    PublicRepos,
    Following,
    Karma,
    Posts,
    Verified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Count(u64),
    /// A signed total such as Reddit karma, which goes negative.
    Score(i64),
    Flag(bool),
    Text(String),
}

/// Platform-specific extras attached to a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileExtra(BTreeMap<ExtraKey, ExtraValue>);

impl ProfileExtra {
    /// Insert a value if present. Absent upstream fields are simply skipped.
    pub fn with(mut self, key: ExtraKey, value: Option<ExtraValue>) -> Self {
        if let Some(value) = value {
            self.0.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: ExtraKey) -> Option<&ExtraValue> {
        self.0.get(&key)
    }

    pub fn count(&self, key: ExtraKey) -> Option<u64> {
        match self.0.get(&key) {
            Some(ExtraValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn score(&self, key: ExtraKey) -> Option<i64> {
        match self.0.get(&key) {
            Some(ExtraValue::Score(n)) => Some(*n),
            Some(ExtraValue::Count(n)) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtraKey, &ExtraValue)> {
        self.0.iter()
    }
}

/// A public profile as returned by one of the platform fetchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub platform: Platform,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub followers: Option<u64>,
    pub location: Option<String>,
    pub profile_url: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "ProfileExtra::is_empty")]
    pub extra: ProfileExtra,
}

impl ProfileRecord {
    /// A bare profile with only the identifying fields set.
    pub fn new(platform: Platform, username: impl Into<String>) -> Self {
        Self {
            platform,
            username: username.into(),
            display_name: None,
            bio: None,
            followers: None,
            location: None,
            profile_url: None,
            avatar_url: None,
            extra: ProfileExtra::default(),
        }
    }

    /// The bio, treating an empty or whitespace-only string as absent.
    pub fn bio_text(&self) -> Option<&str> {
        non_blank(self.bio.as_deref())
    }

    /// The avatar URL, treating an empty string as absent.
    pub fn avatar(&self) -> Option<&str> {
        non_blank(self.avatar_url.as_deref())
    }
}

/// One identity's footprint: at most one profile per platform.
pub type ProfileSet = BTreeMap<Platform, ProfileRecord>;

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Clamp a score into [0, 1]. Non-finite input collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Which signal a similarity score was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityDimension {
    Username,
    Bio,
    Image,
}

impl SimilarityDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityDimension::Username => "Username",
            SimilarityDimension::Bio => "Bio",
            SimilarityDimension::Image => "Profile image",
        }
    }
}

/// A similarity value in [0, 1] tagged with its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub dimension: SimilarityDimension,
    pub value: f64,
}

impl SimilarityScore {
    pub fn new(dimension: SimilarityDimension, value: f64) -> Self {
        Self {
            dimension,
            value: clamp_unit(value),
        }
    }
}

/// How discoverable a single identity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureMetrics {
    pub profile_count: usize,
    pub mention_count: usize,
    /// 0-100
    pub exposure_index: u32,
}

/// Discretised impersonation likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Determine the tier from an impersonation likelihood (0-1).
    /// Lower bounds are inclusive; NaN falls through to Low.
    pub fn from_likelihood(likelihood: f64) -> Self {
        match likelihood {
            l if l >= 0.8 => RiskTier::High,
            l if l >= 0.6 => RiskTier::Moderate,
            _ => RiskTier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The scalar outcome of comparing two identities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpersonationAssessment {
    pub overall_username_sim: f64,
    pub overall_bio_sim: f64,
    pub mutual_presence_ratio: f64,
    /// Absent when no avatar pair could be fetched and hashed.
    pub image_sim: Option<f64>,
    pub likelihood: f64,
    pub risk_tier: RiskTier,
}

impl ImpersonationAssessment {
    /// The per-dimension similarity scores, image last and only if computed.
    pub fn dimension_scores(&self) -> Vec<SimilarityScore> {
        let mut scores = vec![
            SimilarityScore::new(SimilarityDimension::Bio, self.overall_bio_sim),
            SimilarityScore::new(SimilarityDimension::Username, self.overall_username_sim),
        ];
        if let Some(image) = self.image_sim {
            scores.push(SimilarityScore::new(SimilarityDimension::Image, image));
        }
        scores
    }
}

/// A web page mentioning the searched identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub title: String,
    pub link: String,
    pub snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_order_is_collection_order() {
        let mut platforms = vec![Platform::Twitter, Platform::Github, Platform::Instagram];
        platforms.sort();
        assert_eq!(
            platforms,
            vec![Platform::Github, Platform::Instagram, Platform::Twitter]
        );
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Github).unwrap();
        assert_eq!(json, "\"github\"");
    }

    #[test]
    fn test_blank_bio_is_absent() {
        let mut profile = ProfileRecord::new(Platform::Github, "alice");
        profile.bio = Some("   ".to_string());
        assert!(profile.bio_text().is_none());
        profile.bio = Some("hi".to_string());
        assert_eq!(profile.bio_text(), Some("hi"));
    }

    #[test]
    fn test_extra_skips_missing_values() {
        let extra = ProfileExtra::default()
            .with(ExtraKey::PublicRepos, Some(ExtraValue::Count(8)))
            .with(ExtraKey::Following, None);
        assert_eq!(extra.count(ExtraKey::PublicRepos), Some(8));
        assert!(extra.get(ExtraKey::Following).is_none());
    }

    #[test]
    fn test_negative_score_round_trips_untagged() {
        let extra = ProfileExtra::default().with(ExtraKey::Karma, Some(ExtraValue::Score(-37)));
        let json = serde_json::to_string(&extra).unwrap();
        assert_eq!(json, r#"{"karma":-37}"#);
        let back: ProfileExtra = serde_json::from_str(&json).unwrap();
        assert_eq!(back.score(ExtraKey::Karma), Some(-37));
        assert_eq!(back.count(ExtraKey::Karma), None);
    }

    #[test]
    fn test_clamp_unit_handles_nan() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
    }
}
