// HTTP API tests: the Axum router driven in-process with tower's oneshot.
//
// Fetchers are in-memory fakes; no sockets are opened.
#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use memap::models::{Platform, ProfileRecord};
use memap::pipeline::Correlator;
use memap::similarity::SimilarityService;
use memap::sources::mentions::NoMentions;
use memap::sources::{FetchOutcome, ProfileFetcher};
use memap::web::{build_router, AppState};

struct StaticFetcher {
    platform: Platform,
    profiles: HashMap<String, ProfileRecord>,
}

#[async_trait]
impl ProfileFetcher for StaticFetcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        match self.profiles.get(identifier) {
            Some(profile) => FetchOutcome::Found(profile.clone()),
            None => FetchOutcome::NotFound,
        }
    }
}

fn github(entries: &[(&str, &str)]) -> Arc<dyn ProfileFetcher> {
    let profiles = entries
        .iter()
        .map(|(username, bio)| {
            let mut profile = ProfileRecord::new(Platform::Github, *username);
            profile.bio = Some(bio.to_string());
            profile.profile_url = Some(format!("https://github.com/{username}"));
            (username.to_string(), profile)
        })
        .collect();
    Arc::new(StaticFetcher {
        platform: Platform::Github,
        profiles,
    })
}

fn app() -> axum::Router {
    let correlator = Correlator::new(
        vec![github(&[("alice", "I love cats"), ("alice1", "I love cats")])],
        Arc::new(NoMentions),
        Arc::new(SimilarityService::text_only()),
    );
    build_router(AppState {
        correlator: Arc::new(correlator),
    })
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================
// /health
// ============================================================

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ============================================================
// /footprint
// ============================================================

#[tokio::test]
async fn footprint_without_identifiers_is_400() {
    let (status, body) = get("/footprint").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username or full_name is required");
}

#[tokio::test]
async fn footprint_out_of_range_limit_is_400() {
    let (status, body) = get("/footprint?full_name=Jane%20Doe&limit=26").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "limit must be between 1 and 25");
}

#[tokio::test]
async fn footprint_unparseable_limit_is_400() {
    let (status, body) = get("/footprint?username=alice&limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn footprint_by_username_returns_graph() {
    let (status, body) = get("/footprint?username=alice").await;
    assert_eq!(status, StatusCode::OK);

    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["id"], "user:alice");
    assert_eq!(nodes[1]["id"], "github:alice");
    assert_eq!(nodes[1]["meta"]["url"], "https://github.com/alice");

    let edges = body["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["source"], "user:alice");
    assert_eq!(edges[0]["target"], "github:alice");

    assert_eq!(body["query"], "alice");
    assert_eq!(body["exposure"]["exposure_index"], 25);
}

// ============================================================
// /compare
// ============================================================

#[tokio::test]
async fn compare_missing_user_is_400() {
    let (status, body) = get("/compare?user_a=alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_a and user_b are required");
}

#[tokio::test]
async fn compare_returns_assessment_and_graph() {
    let (status, body) = get("/compare?user_a=alice&user_b=alice1").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["user_a"], "alice");
    assert_eq!(body["assessment"]["risk_tier"], "High");
    assert!(body["composite_scores"]["github"]["composite"].as_f64().unwrap() > 0.9);

    let edges = body["edges"].as_array().unwrap();
    let cross = edges
        .iter()
        .find(|e| e["source"] == "A:github" && e["target"] == "B:github")
        .unwrap();
    assert_eq!(cross["label"], "Strong");
    assert!(body["insights"].as_array().unwrap().len() >= 2);
}
