// Single-identity footprint graph.
//
// One center node for the searched identity, one node per discovered
// profile, each attached to the center. The per-platform cap applies here
// too, so a username footprint and a name expansion are bounded the same way.

use crate::models::ProfileSet;

use super::model::{root_node_id, GraphBuilder, GraphNode, GraphResponse};

/// Start a builder holding only the center node `user:{label}`.
/// Returns the builder and the center id.
pub fn centered_builder(center_label: &str) -> (GraphBuilder, String) {
    let center_id = root_node_id(center_label);
    let mut builder = GraphBuilder::new();
    builder.add_node(GraphNode::root(center_id.clone(), center_label));
    (builder, center_id)
}

/// Build the footprint graph for one identity's profile set.
pub fn single_identity_graph(
    center_label: &str,
    profiles: &ProfileSet,
    per_platform: usize,
) -> GraphResponse {
    let (mut builder, center_id) = centered_builder(center_label);

    for profile in profiles.values() {
        builder.add_profile(&center_id, profile);
    }

    builder.cap_per_group(per_platform);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, ProfileRecord};

    #[test]
    fn test_center_and_profile_nodes() {
        let mut profiles = ProfileSet::new();
        let mut gh = ProfileRecord::new(Platform::Github, "alice");
        gh.display_name = Some("Alice".into());
        gh.followers = Some(12);
        profiles.insert(Platform::Github, gh);
        profiles.insert(Platform::Reddit, ProfileRecord::new(Platform::Reddit, "alice"));

        let graph = single_identity_graph("alice", &profiles, 5);

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].id, "user:alice");
        assert_eq!(graph.nodes[0].group.as_deref(), Some("user"));
        assert_eq!(graph.nodes[1].id, "github:alice");
        assert_eq!(graph.nodes[1].label, "github:alice");
        assert_eq!(graph.nodes[1].group.as_deref(), Some("github"));

        let meta = graph.nodes[1].meta.as_ref().unwrap();
        assert_eq!(meta.display_name.as_deref(), Some("Alice"));
        assert_eq!(meta.followers, Some(12));

        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.source == "user:alice"));
        assert_eq!(graph.platform_node_count(), 2);
    }

    #[test]
    fn test_empty_profile_set_is_just_the_center() {
        let graph = single_identity_graph("nobody", &ProfileSet::new(), 5);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.platform_node_count(), 0);
    }
}
