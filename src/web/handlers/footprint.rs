// GET /footprint?username=&full_name=&limit=&per_platform=
//
// Either username or full_name is required. limit (1-25, default 10) caps
// the total platform nodes of a name expansion; per_platform (1-10,
// default 5) caps nodes per platform.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::pipeline::FootprintRequest;
use crate::web::{api_error, AppState};

pub async fn get_footprint(
    State(state): State<AppState>,
    query: Result<Query<FootprintRequest>, QueryRejection>,
) -> Response {
    let Query(request) = match query {
        Ok(query) => query,
        Err(rejection) => return api_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    match state.correlator.footprint(&request).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}
