// Graph response model and the deduplicating builder behind it.
//
// Every graph MeMap produces (footprint, expansion, comparison) goes through
// GraphBuilder, which owns the two hard invariants: node ids are unique
// within a response, and an edge only exists while both of its endpoints do.
// Root nodes (group "user", or no group) are never counted against caps.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{clamp_unit, Platform, ProfileRecord};

/// Group assigned to root / center nodes.
pub const ROOT_GROUP: &str = "user";

/// Metadata shown alongside a profile node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl NodeMeta {
    /// Full metadata for a footprint node.
    pub fn full(profile: &ProfileRecord) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            followers: profile.followers,
            url: profile.profile_url.clone(),
            avatar: profile.avatar_url.clone(),
        }
    }

    /// Reduced metadata for a comparison node: bio, url and avatar only.
    pub fn summary(profile: &ProfileRecord) -> Self {
        Self {
            bio: profile.bio.clone(),
            url: profile.profile_url.clone(),
            avatar: profile.avatar_url.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
}

impl GraphNode {
    /// A root node in the `user` group.
    pub fn root(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group: Some(ROOT_GROUP.to_string()),
            meta: None,
        }
    }

    /// A footprint node for a fetched profile: id and label are
    /// `{platform}:{username}`, grouped by platform.
    pub fn profile(profile: &ProfileRecord) -> Self {
        let id = profile_node_id(profile.platform, &profile.username);
        Self {
            label: id.clone(),
            id,
            group: Some(profile.platform.as_str().to_string()),
            meta: Some(NodeMeta::full(profile)),
        }
    }

    /// Roots are exempt from every cap.
    pub fn is_root(&self) -> bool {
        match self.group.as_deref() {
            None => true,
            Some(group) => group == ROOT_GROUP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GraphEdge {
    /// An unweighted, unlabelled edge.
    pub fn link(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: None,
            label: None,
        }
    }

    /// A similarity edge. The weight is clamped to [0, 1] and the label is
    /// the qualitative strength of that weight.
    pub fn similarity(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        let weight = clamp_unit(weight);
        Self {
            source: source.into(),
            target: target.into(),
            weight: Some(weight),
            label: Some(EdgeStrength::from_score(weight).as_str().to_string()),
        }
    }
}

/// The transport-independent graph shape returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphResponse {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of non-root nodes.
    pub fn platform_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_root()).count()
    }

    /// Non-root node count per group.
    pub fn group_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for node in self.nodes.iter().filter(|n| !n.is_root()) {
            if let Some(group) = node.group.as_deref() {
                *counts.entry(group).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Qualitative strength of a cross-identity similarity edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStrength {
    Strong,
    Medium,
    Weak,
}

impl EdgeStrength {
    /// `Strong` ≥ 0.8, `Medium` ≥ 0.6, `Weak` otherwise.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.8 => EdgeStrength::Strong,
            s if s >= 0.6 => EdgeStrength::Medium,
            _ => EdgeStrength::Weak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStrength::Strong => "Strong",
            EdgeStrength::Medium => "Medium",
            EdgeStrength::Weak => "Weak",
        }
    }
}

/// `{platform}:{username}`
pub fn profile_node_id(platform: Platform, username: &str) -> String {
    format!("{}:{}", platform.as_str(), username)
}

/// `user:{label}`
pub fn root_node_id(label: &str) -> String {
    format!("{ROOT_GROUP}:{label}")
}

/// Accumulates nodes and edges in insertion order.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    ids: HashSet<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns false (and changes nothing) if the id exists.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if !self.ids.insert(node.id.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Add an edge. Returns false if either endpoint is not a node.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if !self.contains(&edge.source) || !self.contains(&edge.target) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Add a profile node attached to `root_id`. Re-adding the same
    /// (platform, username) is a no-op and returns false.
    pub fn add_profile(&mut self, root_id: &str, profile: &ProfileRecord) -> bool {
        let node = GraphNode::profile(profile);
        let id = node.id.clone();
        if !self.add_node(node) {
            return false;
        }
        self.add_edge(GraphEdge::link(root_id, id));
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of non-root nodes.
    pub fn platform_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_root()).count()
    }

    /// Keep only the first `cap` non-root nodes of each group, in insertion
    /// order, and drop every edge that lost an endpoint.
    pub fn cap_per_group(&mut self, cap: usize) {
        let mut counts: HashMap<String, usize> = HashMap::new();

        self.nodes.retain(|node| {
            if node.is_root() {
                return true;
            }
            let group = node.group.clone().unwrap_or_default();
            let seen = counts.entry(group).or_insert(0);
            if *seen < cap {
                *seen += 1;
                true
            } else {
                false
            }
        });

        self.ids = self.nodes.iter().map(|n| n.id.clone()).collect();
        let ids = &self.ids;
        self.edges
            .retain(|e| ids.contains(&e.source) && ids.contains(&e.target));
    }

    pub fn build(self) -> GraphResponse {
        GraphResponse {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_strength_boundaries() {
        assert_eq!(EdgeStrength::from_score(0.8), EdgeStrength::Strong);
        assert_eq!(EdgeStrength::from_score(0.79), EdgeStrength::Medium);
        assert_eq!(EdgeStrength::from_score(0.6), EdgeStrength::Medium);
        assert_eq!(EdgeStrength::from_score(0.59), EdgeStrength::Weak);
        assert_eq!(EdgeStrength::from_score(f64::NAN), EdgeStrength::Weak);
    }

    #[test]
    fn test_duplicate_node_is_noop() {
        let mut builder = GraphBuilder::new();
        assert!(builder.add_node(GraphNode::root("user:a", "a")));
        assert!(!builder.add_node(GraphNode::root("user:a", "other label")));
        let graph = builder.build();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].label, "a");
    }

    #[test]
    fn test_edge_requires_both_endpoints() {
        let mut builder = GraphBuilder::new();
        builder.add_node(GraphNode::root("user:a", "a"));
        assert!(!builder.add_edge(GraphEdge::link("user:a", "github:missing")));
        assert!(builder.build().edges.is_empty());
    }

    #[test]
    fn test_similarity_edge_is_clamped_and_labelled() {
        let edge = GraphEdge::similarity("A:github", "B:github", 1.7);
        assert_eq!(edge.weight, Some(1.0));
        assert_eq!(edge.label.as_deref(), Some("Strong"));
    }

    #[test]
    fn test_roots_exempt_from_cap() {
        let mut builder = GraphBuilder::new();
        builder.add_node(GraphNode::root("user:A", "a"));
        builder.add_node(GraphNode::root("user:B", "b"));
        builder.cap_per_group(1);
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.platform_node_count(), 0);
    }

    #[test]
    fn test_optional_fields_are_omitted_in_json() {
        let edge = GraphEdge::link("user:a", "github:a");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json, serde_json::json!({"source": "user:a", "target": "github:a"}));

        let mut profile = ProfileRecord::new(Platform::Github, "a");
        profile.bio = Some("hi".into());
        let meta = serde_json::to_value(NodeMeta::summary(&profile)).unwrap();
        assert_eq!(meta, serde_json::json!({"bio": "hi"}));
    }
}
