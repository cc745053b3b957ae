use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::Deserialize;
use skyfare_core::{DetailFetchRequest, DetailView, SearchCriteria, SearchSession};
use tracing::{debug, info};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub criteria: SearchCriteria,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    /// Identifies the requesting view; defaults to a single shared slot.
    #[serde(default = "default_consumer")]
    pub consumer: String,
    #[serde(flatten)]
    pub request: DetailFetchRequest,
}

fn default_consumer() -> String {
    "default".to_string()
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights/search", post(search_flights))
        .route("/v1/flights/details", post(flight_details))
        .route("/v1/flights/details/{consumer}", delete(cancel_details))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/flights/search
pub async fn search_flights(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchSession>, AppError> {
    req.criteria.validate()?;

    let limit = req.limit.unwrap_or_else(|| state.search.limit());
    let session = state.search.search_with_limit(&req.criteria, limit).await?;
    Ok(Json(session))
}

/// POST /v1/flights/details
/// A newer request from the same consumer aborts this one, which then answers 204.
pub async fn flight_details(
    State(state): State<AppState>,
    Json(req): Json<DetailsRequest>,
) -> Result<Json<DetailView>, AppError> {
    let fetcher = state.details.for_consumer(&req.consumer);
    match fetcher.fetch(&req.request).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            if e.is_cancelled() {
                debug!("Detail request from {} superseded", req.consumer);
            }
            Err(e.into())
        }
    }
}

/// DELETE /v1/flights/details/{consumer}
pub async fn cancel_details(
    State(state): State<AppState>,
    Path(consumer): Path<String>,
) -> StatusCode {
    if state.details.cancel(&consumer) {
        info!("Cancelled live detail fetch for {}", consumer);
    }
    StatusCode::NO_CONTENT
}
