//! Show catalog handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use popcorn_core::{CastMember, GenreCollection, Show};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ShowListResponse {
    pub shows: Vec<Show>,
    pub total: usize,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoadShowsRequest {
    #[serde(default)]
    pub pages: Option<Vec<u32>>,
}

#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub genre_count: usize,
    pub is_loading: bool,
    pub error: Option<String>,
    pub loaded_pages: Vec<u32>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/shows
///
/// All indexed shows, sorted by rating.
pub async fn list_shows(State(state): State<Arc<AppState>>) -> Json<ShowListResponse> {
    let snapshot = state.catalog().snapshot();
    Json(ShowListResponse {
        shows: snapshot.shows().to_vec(),
        total: snapshot.len(),
        is_loading: snapshot.is_loading(),
        error: snapshot.error().map(str::to_string),
    })
}

/// GET /api/v1/shows/genres
pub async fn list_genres(State(state): State<Arc<AppState>>) -> Json<Vec<GenreCollection>> {
    Json(state.catalog().genre_collections().to_vec())
}

/// POST /api/v1/shows/load
///
/// Load the requested pages, or the configured default pages when the body
/// is empty or has no `pages` field. An empty `pages` list loads nothing.
pub async fn load_shows(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CatalogSummary>, ApiError> {
    let request: LoadShowsRequest = if body.is_empty() {
        LoadShowsRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
        })?
    };

    let catalog = state.catalog();
    match request.pages {
        Some(pages) => catalog.load_shows(&pages).await,
        None => catalog.load_default_pages().await,
    }

    let snapshot = catalog.snapshot();
    Ok(Json(CatalogSummary {
        total: snapshot.len(),
        genre_count: snapshot.genre_collections().len(),
        is_loading: snapshot.is_loading(),
        error: snapshot.error().map(str::to_string),
        loaded_pages: catalog.loaded_pages(),
    }))
}

/// GET /api/v1/shows/{id}
///
/// Full show details, fetched on demand. Viewing a show records it in the
/// recently-viewed list.
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Show>, ApiError> {
    if id == 0 {
        return Err(error_response(StatusCode::BAD_REQUEST, "Show id must be positive"));
    }

    let Some(show) = state.catalog().ensure_show(id).await else {
        let message = state
            .catalog()
            .error()
            .unwrap_or_else(|| format!("Show {} not found", id));
        return Err(error_response(StatusCode::NOT_FOUND, message));
    };

    state.recently_viewed().add(show.clone()).await;
    debug!(show_id = id, "Recorded show view");

    Ok(Json(show))
}

/// GET /api/v1/shows/{id}/cast
pub async fn get_cast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Vec<CastMember>>, impl IntoResponse> {
    state
        .catalog()
        .api()
        .fetch_cast(id, None)
        .await
        .map(Json)
        .map_err(|e| error_response(StatusCode::BAD_GATEWAY, e.to_string()))
}
