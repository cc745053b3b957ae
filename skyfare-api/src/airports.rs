use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use skyfare_core::{should_lookup, AirportCandidate};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AirportQuery {
    #[serde(default)]
    pub query: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/airports", get(search_airports))
}

/// GET /v1/airports?query=
/// Suggestions never fail: short queries and provider errors both yield `[]`.
pub async fn search_airports(
    State(state): State<AppState>,
    Query(params): Query<AirportQuery>,
) -> Json<Vec<AirportCandidate>> {
    if !should_lookup(&params.query) {
        return Json(Vec::new());
    }
    Json(state.lookup.lookup_or_empty(&params.query).await)
}
