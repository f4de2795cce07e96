// Web server: Axum-based JSON API over the correlator.
//
// Three read-only routes: /health, /footprint and /compare. The two
// analysis routes return the report JSON, whose top-level `nodes` and
// `edges` are the graph response. Invalid requests get a 400 with
// `{"error": message}`.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::CorrelationError;
use crate::pipeline::Correlator;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub correlator: Arc<Correlator>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(correlator: Correlator, port: u16, bind: &str) -> Result<()> {
    let state = AppState {
        correlator: Arc::new(correlator),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("MeMap API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/footprint", get(handlers::footprint::get_footprint))
        .route("/compare", get(handlers::compare::get_compare))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

impl IntoResponse for CorrelationError {
    fn into_response(self) -> Response {
        match &self {
            CorrelationError::InvalidRequest(message) => {
                api_error(StatusCode::BAD_REQUEST, message)
            }
        }
    }
}
