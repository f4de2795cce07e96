// Name-driven expansion graph.
//
// Given only a display name, generate candidate handles and probe every
// platform for each of them, attaching whatever is found to the center node.
// Probing is sequential so the total-node cap cuts off at the same place on
// every run: candidates in generation order, platforms in EXPANSION_ORDER.

use std::sync::Arc;

use tracing::{debug, info};

use crate::candidates::handle_candidates;
use crate::models::Platform;
use crate::sources::{FetchOutcome, ProfileFetcher};

use super::footprint::centered_builder;
use super::model::GraphResponse;

/// Platform probe order for each candidate.
pub const EXPANSION_ORDER: [Platform; 4] = [
    Platform::Instagram,
    Platform::Twitter,
    Platform::Github,
    Platform::Reddit,
];

/// Bounds for one expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionLimits {
    /// Maximum number of non-root nodes.
    pub total: usize,
    /// Maximum number of nodes per platform, applied after expansion.
    pub per_platform: usize,
    /// Maximum number of candidate handles to probe.
    pub max_candidates: usize,
}

fn priority(platform: Platform) -> usize {
    EXPANSION_ORDER
        .iter()
        .position(|p| *p == platform)
        .unwrap_or(EXPANSION_ORDER.len())
}

/// Order fetchers by EXPANSION_ORDER. Ties keep their registration order.
pub fn by_priority(fetchers: &[Arc<dyn ProfileFetcher>]) -> Vec<Arc<dyn ProfileFetcher>> {
    let mut ordered = fetchers.to_vec();
    ordered.sort_by_key(|f| priority(f.platform()));
    ordered
}

/// Build the expansion graph centered on `full_name`.
pub async fn expansion_graph(
    full_name: &str,
    fetchers: &[Arc<dyn ProfileFetcher>],
    limits: ExpansionLimits,
) -> GraphResponse {
    let (mut builder, center_id) = centered_builder(full_name);
    let candidates = handle_candidates(full_name, limits.max_candidates);
    let fetchers = by_priority(fetchers);

    let mut probes = 0usize;

    'candidates: for candidate in &candidates {
        if builder.platform_node_count() >= limits.total {
            break;
        }
        for fetcher in &fetchers {
            probes += 1;
            if let FetchOutcome::Found(profile) = fetcher.fetch(candidate).await {
                let added = builder.add_profile(&center_id, &profile);
                debug!(
                    candidate = candidate.as_str(),
                    platform = fetcher.platform().as_str(),
                    added,
                    "Expansion match"
                );
                if builder.platform_node_count() >= limits.total {
                    break 'candidates;
                }
            }
        }
    }

    let found = builder.platform_node_count();
    builder.cap_per_group(limits.per_platform);

    info!(
        full_name,
        candidates = candidates.len(),
        probes,
        found,
        kept = builder.platform_node_count(),
        "Name expansion complete"
    );

    builder.build()
}
