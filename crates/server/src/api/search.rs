//! Show search handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use popcorn_core::{filter_by_min_rating, SearchResult};
use serde::{Deserialize, Serialize};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total: usize,
}

/// Run a search through the catalog and apply the optional rating floor.
pub(crate) async fn run_search(
    state: &AppState,
    query: &str,
    min_rating: Option<f64>,
) -> Result<SearchResponse, (StatusCode, Json<ErrorResponse>)> {
    let hits = state
        .catalog()
        .search_shows(query, None)
        .await
        .map_err(|e| error_response(StatusCode::BAD_GATEWAY, e.to_string()))?;

    let results = match min_rating {
        Some(min) => filter_by_min_rating(&hits, min),
        None => hits.to_vec(),
    };

    Ok(SearchResponse {
        query: query.to_string(),
        total: results.len(),
        results,
    })
}

/// GET /api/v1/search?q=&min_rating=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    run_search(&state, &params.q, params.min_rating)
        .await
        .map(Json)
}
