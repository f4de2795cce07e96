// Pairwise comparison graph.
//
//   user:A ── A:github ══ B:github ── user:B
//          └─ A:reddit          └─ B:twitter
//
// Each side hangs its platform nodes off its own root. Platforms present on
// both sides get a cross edge weighted by the composite score.

use std::collections::BTreeMap;

use crate::models::{Platform, ProfileRecord, ProfileSet};
use crate::scoring::impersonation::PlatformComparison;

use super::model::{GraphBuilder, GraphEdge, GraphNode, GraphResponse, NodeMeta};

pub const ROOT_A: &str = "user:A";
pub const ROOT_B: &str = "user:B";

fn side_node(side: &str, profile: &ProfileRecord) -> GraphNode {
    let platform = profile.platform.as_str();
    GraphNode {
        id: format!("{side}:{platform}"),
        label: format!("{side}:{platform}:{}", profile.username),
        group: Some(platform.to_string()),
        meta: Some(NodeMeta::summary(profile)),
    }
}

/// Build the comparison graph. `comparisons` must come from
/// [`compare_platforms`](crate::scoring::impersonation::compare_platforms)
/// over the same two profile sets.
pub fn pairwise_graph(
    user_a: &str,
    user_b: &str,
    profiles_a: &ProfileSet,
    profiles_b: &ProfileSet,
    comparisons: &BTreeMap<Platform, PlatformComparison>,
) -> GraphResponse {
    let mut builder = GraphBuilder::new();
    builder.add_node(GraphNode::root(ROOT_A, user_a));
    builder.add_node(GraphNode::root(ROOT_B, user_b));

    for platform in Platform::ALL {
        let a = profiles_a.get(&platform);
        let b = profiles_b.get(&platform);

        if let Some(profile) = a {
            let node = side_node("A", profile);
            let id = node.id.clone();
            builder.add_node(node);
            builder.add_edge(GraphEdge::link(ROOT_A, id));
        }
        if let Some(profile) = b {
            let node = side_node("B", profile);
            let id = node.id.clone();
            builder.add_node(node);
            builder.add_edge(GraphEdge::link(ROOT_B, id));
        }

        if let (Some(_), Some(_), Some(comparison)) = (a, b, comparisons.get(&platform)) {
            builder.add_edge(GraphEdge::similarity(
                format!("A:{platform}"),
                format!("B:{platform}"),
                comparison.composite,
            ));
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::impersonation::composite_score;

    fn profile(platform: Platform, username: &str) -> ProfileRecord {
        ProfileRecord::new(platform, username)
    }

    #[test]
    fn test_cross_edge_only_for_shared_platforms() {
        let mut a = ProfileSet::new();
        a.insert(Platform::Github, profile(Platform::Github, "alice"));
        a.insert(Platform::Reddit, profile(Platform::Reddit, "alice"));
        let mut b = ProfileSet::new();
        b.insert(Platform::Github, profile(Platform::Github, "alice1"));
        b.insert(Platform::Twitter, profile(Platform::Twitter, "alice1"));

        let mut comparisons = BTreeMap::new();
        comparisons.insert(
            Platform::Github,
            PlatformComparison {
                username_sim: 0.9,
                bio_sim: 0.5,
                composite: composite_score(0.9, 0.5),
                both_bios: true,
            },
        );

        let graph = pairwise_graph("alice", "alice1", &a, &b, &comparisons);

        // 2 roots + A:github, B:github, A:reddit, B:twitter
        assert_eq!(graph.nodes.len(), 6);
        assert_eq!(graph.node("user:A").unwrap().label, "alice");
        assert_eq!(graph.node("A:github").unwrap().label, "A:github:alice");
        assert_eq!(graph.node("B:twitter").unwrap().label, "B:twitter:alice1");

        let cross: Vec<_> = graph.edges.iter().filter(|e| e.weight.is_some()).collect();
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].source, "A:github");
        assert_eq!(cross[0].target, "B:github");
        assert!((cross[0].weight.unwrap() - 0.7).abs() < 1e-12);
        assert_eq!(cross[0].label.as_deref(), Some("Medium"));

        // 4 root attachments + 1 cross edge
        assert_eq!(graph.edges.len(), 5);
    }

    #[test]
    fn test_no_profiles_is_two_roots() {
        let graph = pairwise_graph("a", "b", &ProfileSet::new(), &ProfileSet::new(), &BTreeMap::new());
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_summary_meta_has_no_display_name() {
        let mut p = profile(Platform::Github, "alice");
        p.display_name = Some("Alice".into());
        p.bio = Some("hi".into());
        let mut a = ProfileSet::new();
        a.insert(Platform::Github, p);

        let graph = pairwise_graph("alice", "bob", &a, &ProfileSet::new(), &BTreeMap::new());
        let meta = graph.node("A:github").unwrap().meta.as_ref().unwrap();
        assert!(meta.display_name.is_none());
        assert_eq!(meta.bio.as_deref(), Some("hi"));
    }
}
