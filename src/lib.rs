// MeMap: identity correlation and footprint graphs
//
// This is the library root. Each module corresponds to a major subsystem
// of the correlation engine.

pub mod candidates;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod similarity;
pub mod sources;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
