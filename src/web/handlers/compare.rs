// GET /compare?user_a=&user_b=: impersonation comparison of two identities.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    #[serde(default)]
    pub user_a: String,
    #[serde(default)]
    pub user_b: String,
}

pub async fn get_compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Response {
    match state.correlator.compare(&params.user_a, &params.user_b).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}
