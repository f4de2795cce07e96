// Graph construction: footprint, expansion and comparison graphs.

pub mod compare;
pub mod expansion;
pub mod footprint;
pub mod model;

pub use model::{EdgeStrength, GraphBuilder, GraphEdge, GraphNode, GraphResponse, NodeMeta};
