// Impersonation likelihood between two identities.
//
// Per shared platform we blend username and bio similarity 50/50 into a
// composite score. Across the whole identity we combine four signals:
//
//   likelihood = 0.4 * bio + 0.3 * username + 0.2 * mutual presence + 0.1 * image
//
// where bio is averaged over platforms with both bios present, username is
// compared on the two root query strings, mutual presence is the Jaccard
// ratio of the two platform sets, and image comes from a single avatar pair.
// A missing signal contributes 0 rather than failing the assessment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{
    clamp_unit, ImpersonationAssessment, Platform, ProfileSet, RiskTier,
};
use crate::similarity::SimilarityService;

/// Composite weights. They sum to 1.
pub const COMPOSITE_USERNAME_WEIGHT: f64 = 0.5;
pub const COMPOSITE_BIO_WEIGHT: f64 = 0.5;

/// The platform whose avatars are tried when no shared platform has both.
pub const DEFAULT_ANCHOR_PLATFORM: Platform = Platform::Github;

/// Weights for the impersonation likelihood formula.
#[derive(Debug, Clone, Copy)]
pub struct ImpersonationWeights {
    /// Weight of the averaged bio similarity (default 0.4)
    pub bio: f64,
    /// Weight of the root username similarity (default 0.3)
    pub username: f64,
    /// Weight of the mutual presence ratio (default 0.2)
    pub presence: f64,
    /// Weight of avatar similarity when available (default 0.1)
    pub image: f64,
}

impl Default for ImpersonationWeights {
    fn default() -> Self {
        Self {
            bio: 0.4,
            username: 0.3,
            presence: 0.2,
            image: 0.1,
        }
    }
}

/// Similarity of one platform shared by both identities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformComparison {
    pub username_sim: f64,
    pub bio_sim: f64,
    /// 0.5 * username_sim + 0.5 * bio_sim
    pub composite: f64,
    /// Both profiles on this platform carry a non-empty bio.
    #[serde(skip)]
    pub both_bios: bool,
}

/// Blend username and bio similarity into the per-platform composite.
pub fn composite_score(username_sim: f64, bio_sim: f64) -> f64 {
    clamp_unit(COMPOSITE_USERNAME_WEIGHT * username_sim + COMPOSITE_BIO_WEIGHT * bio_sim)
}

/// Compare every platform present in both profile sets, using each
/// platform's own username and bio. Iteration order is `Platform` order.
pub async fn compare_platforms(
    similarity: &SimilarityService,
    profiles_a: &ProfileSet,
    profiles_b: &ProfileSet,
) -> BTreeMap<Platform, PlatformComparison> {
    let mut comparisons = BTreeMap::new();

    for (platform, a) in profiles_a {
        let Some(b) = profiles_b.get(platform) else {
            continue;
        };

        let username_sim = similarity.compare_usernames(Some(&a.username), Some(&b.username));
        let bio_sim = similarity.bio_similarity(a.bio_text(), b.bio_text()).await;

        comparisons.insert(
            *platform,
            PlatformComparison {
                username_sim,
                bio_sim,
                composite: composite_score(username_sim, bio_sim),
                both_bios: a.bio_text().is_some() && b.bio_text().is_some(),
            },
        );
    }

    comparisons
}

/// Mean bio similarity over platforms where both bios exist; 0.0 if none.
pub fn overall_bio_similarity(comparisons: &BTreeMap<Platform, PlatformComparison>) -> f64 {
    let sims: Vec<f64> = comparisons
        .values()
        .filter(|c| c.both_bios)
        .map(|c| c.bio_sim)
        .collect();

    if sims.is_empty() {
        0.0
    } else {
        clamp_unit(sims.iter().sum::<f64>() / sims.len() as f64)
    }
}

/// |A ∩ B| / |A ∪ B| over platforms; 0.0 when both are empty.
pub fn mutual_presence_ratio(profiles_a: &ProfileSet, profiles_b: &ProfileSet) -> f64 {
    let shared = profiles_a
        .keys()
        .filter(|p| profiles_b.contains_key(p))
        .count();
    let union = profiles_a.len() + profiles_b.len() - shared;

    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Pick the single avatar pair to compare.
///
/// The first compared platform (in map order) where both sides have an
/// avatar wins. Otherwise the anchor platform is tried. Otherwise none.
pub fn select_avatar_pair<'a>(
    profiles_a: &'a ProfileSet,
    profiles_b: &'a ProfileSet,
    comparisons: &BTreeMap<Platform, PlatformComparison>,
    anchor: Platform,
) -> Option<(&'a str, &'a str)> {
    let pair_on = |platform: &Platform| {
        let a = profiles_a.get(platform)?.avatar()?;
        let b = profiles_b.get(platform)?.avatar()?;
        Some((a, b))
    };

    comparisons
        .keys()
        .find_map(&pair_on)
        .or_else(|| pair_on(&anchor))
}

/// The weighted impersonation likelihood, clamped to 0.0-1.0.
pub fn impersonation_likelihood(
    bio_sim: f64,
    username_sim: f64,
    mutual_presence: f64,
    image_sim: Option<f64>,
    weights: &ImpersonationWeights,
) -> f64 {
    clamp_unit(
        weights.bio * bio_sim
            + weights.username * username_sim
            + weights.presence * mutual_presence
            + weights.image * image_sim.unwrap_or(0.0),
    )
}

/// Assemble an assessment from its four signals.
pub fn build_assessment(
    overall_bio_sim: f64,
    overall_username_sim: f64,
    mutual_presence_ratio: f64,
    image_sim: Option<f64>,
    weights: &ImpersonationWeights,
) -> ImpersonationAssessment {
    let overall_bio_sim = clamp_unit(overall_bio_sim);
    let overall_username_sim = clamp_unit(overall_username_sim);
    let mutual_presence_ratio = clamp_unit(mutual_presence_ratio);
    let image_sim = image_sim.map(clamp_unit);

    let likelihood = impersonation_likelihood(
        overall_bio_sim,
        overall_username_sim,
        mutual_presence_ratio,
        image_sim,
        weights,
    );

    ImpersonationAssessment {
        overall_username_sim,
        overall_bio_sim,
        mutual_presence_ratio,
        image_sim,
        likelihood,
        risk_tier: RiskTier::from_likelihood(likelihood),
    }
}

/// Score two identities against each other.
///
/// `root_a`/`root_b` are the two top-level query strings; `comparisons` is
/// the output of [`compare_platforms`] for the same profile sets.
#[allow(clippy::too_many_arguments)]
pub async fn assess(
    similarity: &SimilarityService,
    root_a: &str,
    root_b: &str,
    profiles_a: &ProfileSet,
    profiles_b: &ProfileSet,
    comparisons: &BTreeMap<Platform, PlatformComparison>,
    anchor: Platform,
    weights: &ImpersonationWeights,
) -> ImpersonationAssessment {
    let username_sim = similarity.compare_usernames(Some(root_a), Some(root_b));
    let bio_sim = overall_bio_similarity(comparisons);
    let presence = mutual_presence_ratio(profiles_a, profiles_b);

    let image_sim = match select_avatar_pair(profiles_a, profiles_b, comparisons, anchor) {
        Some((url_a, url_b)) => similarity.image_similarity(Some(url_a), Some(url_b)).await,
        None => None,
    };

    let assessment = build_assessment(bio_sim, username_sim, presence, image_sim, weights);

    info!(
        user_a = root_a,
        user_b = root_b,
        bio = format!("{:.2}", assessment.overall_bio_sim),
        username = format!("{:.2}", assessment.overall_username_sim),
        presence = format!("{:.2}", assessment.mutual_presence_ratio),
        image = ?assessment.image_sim,
        likelihood = format!("{:.2}", assessment.likelihood),
        tier = assessment.risk_tier.as_str(),
        "Assessed impersonation likelihood"
    );

    assessment
}

/// Plain-language findings for a comparison, strongest signals first.
pub fn insights(assessment: &ImpersonationAssessment) -> Vec<String> {
    let mut out = Vec::new();

    if assessment.overall_bio_sim >= 0.8 {
        out.push("Bio content highly similar: possible impersonation.".to_string());
    } else if assessment.overall_bio_sim >= 0.6 {
        out.push("Bios show notable overlap, worth investigating.".to_string());
    }

    if assessment.overall_username_sim >= 0.9 {
        out.push("Usernames nearly identical: a typical impersonation pattern.".to_string());
    } else if assessment.overall_username_sim >= 0.75 {
        out.push("Usernames share a strong root and could be related accounts.".to_string());
    }

    if assessment.mutual_presence_ratio >= 0.5 {
        out.push("Strong mutual platform presence detected.".to_string());
    }

    match assessment.image_sim {
        Some(image) if image >= 0.8 => out.push("Profile images look very similar.".to_string()),
        Some(image) if image >= 0.6 => {
            out.push("Profile images share some visual similarity.".to_string())
        }
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileRecord;

    fn set(entries: &[(Platform, &str, Option<&str>)]) -> ProfileSet {
        entries
            .iter()
            .map(|(platform, user, avatar)| {
                let mut profile = ProfileRecord::new(*platform, *user);
                profile.avatar_url = avatar.map(str::to_string);
                (*platform, profile)
            })
            .collect()
    }

    fn comparison(bio_sim: f64, both_bios: bool) -> PlatformComparison {
        PlatformComparison {
            username_sim: 0.5,
            bio_sim,
            composite: composite_score(0.5, bio_sim),
            both_bios,
        }
    }

    #[test]
    fn test_composite_weights_sum_to_one() {
        assert!((COMPOSITE_USERNAME_WEIGHT + COMPOSITE_BIO_WEIGHT - 1.0).abs() < f64::EPSILON);
        assert!((composite_score(1.0, 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_likelihood_weights_sum_to_one() {
        let w = ImpersonationWeights::default();
        assert!((w.bio + w.username + w.presence + w.image - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_likelihood_example() {
        let w = ImpersonationWeights::default();
        // 0.4 * 0.5 + 0.3 * 1.0 + 0.2 * 0.5 + 0.1 * 0 = 0.6
        let l = impersonation_likelihood(0.5, 1.0, 0.5, None, &w);
        assert!((l - 0.6).abs() < 1e-12, "got {l}");
    }

    #[test]
    fn test_likelihood_extremes() {
        let w = ImpersonationWeights::default();
        assert!(impersonation_likelihood(0.0, 0.0, 0.0, None, &w).abs() < f64::EPSILON);
        let max = impersonation_likelihood(1.0, 1.0, 1.0, Some(1.0), &w);
        assert!((max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overall_bio_ignores_platforms_without_both_bios() {
        let mut comparisons = BTreeMap::new();
        comparisons.insert(Platform::Github, comparison(0.9, true));
        comparisons.insert(Platform::Reddit, comparison(0.0, false));
        comparisons.insert(Platform::Twitter, comparison(0.5, true));
        let overall = overall_bio_similarity(&comparisons);
        assert!((overall - 0.7).abs() < 1e-12, "got {overall}");
    }

    #[test]
    fn test_overall_bio_zero_without_bios() {
        let mut comparisons = BTreeMap::new();
        comparisons.insert(Platform::Github, comparison(0.0, false));
        assert_eq!(overall_bio_similarity(&comparisons), 0.0);
        assert_eq!(overall_bio_similarity(&BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_mutual_presence_partial() {
        let a = set(&[(Platform::Github, "a", None), (Platform::Reddit, "a", None)]);
        let b = set(&[(Platform::Github, "b", None), (Platform::Twitter, "b", None)]);
        // shared {github}, union {github, reddit, twitter}
        let ratio = mutual_presence_ratio(&a, &b);
        assert!((ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_avatar_pair_prefers_first_shared_platform() {
        let a = set(&[
            (Platform::Github, "a", None),
            (Platform::Reddit, "a", Some("https://a/reddit.png")),
            (Platform::Twitter, "a", Some("https://a/twitter.png")),
        ]);
        let b = set(&[
            (Platform::Github, "b", Some("https://b/github.png")),
            (Platform::Reddit, "b", Some("https://b/reddit.png")),
            (Platform::Twitter, "b", Some("https://b/twitter.png")),
        ]);
        let mut comparisons = BTreeMap::new();
        for p in [Platform::Github, Platform::Reddit, Platform::Twitter] {
            comparisons.insert(p, comparison(0.0, false));
        }

        let pair = select_avatar_pair(&a, &b, &comparisons, Platform::Github);
        assert_eq!(pair, Some(("https://a/reddit.png", "https://b/reddit.png")));
    }

    #[test]
    fn test_avatar_pair_falls_back_to_anchor() {
        let a = set(&[(Platform::Github, "a", Some("https://a/gh.png"))]);
        let b = set(&[(Platform::Github, "b", Some("https://b/gh.png"))]);
        // No compared platforms at all, anchor still has both avatars
        let pair = select_avatar_pair(&a, &b, &BTreeMap::new(), Platform::Github);
        assert_eq!(pair, Some(("https://a/gh.png", "https://b/gh.png")));
    }

    #[test]
    fn test_avatar_pair_absent() {
        let a = set(&[(Platform::Github, "a", Some("https://a/gh.png"))]);
        let b = set(&[(Platform::Github, "b", None)]);
        let mut comparisons = BTreeMap::new();
        comparisons.insert(Platform::Github, comparison(0.0, false));
        assert!(select_avatar_pair(&a, &b, &comparisons, Platform::Github).is_none());
    }

    #[test]
    fn test_build_assessment_tier() {
        let w = ImpersonationWeights::default();
        let assessment = build_assessment(1.0, 1.0, 1.0, None, &w);
        // 0.4 + 0.3 + 0.2 = 0.9
        assert!((assessment.likelihood - 0.9).abs() < 1e-12);
        assert_eq!(assessment.risk_tier, RiskTier::High);
        assert!(assessment.image_sim.is_none());
    }

    #[test]
    fn test_insights_for_strong_match() {
        let w = ImpersonationWeights::default();
        let assessment = build_assessment(0.85, 0.95, 1.0, Some(0.7), &w);
        let found = insights(&assessment);
        assert_eq!(found.len(), 4);
        assert!(found[0].starts_with("Bio content highly similar"));
        assert!(found[1].starts_with("Usernames nearly identical"));
        assert!(found[3].contains("some visual similarity"));
    }

    #[test]
    fn test_insights_empty_for_weak_match() {
        let w = ImpersonationWeights::default();
        let assessment = build_assessment(0.1, 0.2, 0.0, None, &w);
        assert!(insights(&assessment).is_empty());
    }
}
