// Similarity service: username, bio and avatar similarity.

pub mod download;
pub mod embeddings;
pub mod fuzzy;
pub mod image;
pub mod phash;
pub mod service;

pub use service::{compare_usernames, SimilarityService};
