// Exposure index: how discoverable a single identity is.
//
// A simple heuristic: each platform profile found adds 25 points and each web
// mention adds 10, capped at 100. Four profiles alone saturate the index.

use crate::models::ExposureMetrics;

const POINTS_PER_PROFILE: u32 = 25;
const POINTS_PER_MENTION: u32 = 10;
const MAX_INDEX: u32 = 100;

/// `clamp(profiles * 25 + mentions * 10, 0, 100)`.
pub fn exposure_index(profile_count: usize, mention_count: usize) -> u32 {
    let profiles = u32::try_from(profile_count).unwrap_or(u32::MAX);
    let mentions = u32::try_from(mention_count).unwrap_or(u32::MAX);

    profiles
        .saturating_mul(POINTS_PER_PROFILE)
        .saturating_add(mentions.saturating_mul(POINTS_PER_MENTION))
        .min(MAX_INDEX)
}

impl ExposureMetrics {
    pub fn from_counts(profile_count: usize, mention_count: usize) -> Self {
        Self {
            profile_count,
            mention_count,
            exposure_index: exposure_index(profile_count, mention_count),
        }
    }
}
