//! Watchlist, recently-viewed and saved-search handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use popcorn_core::{SavedSearch, Show};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::handlers::{error_response, ErrorResponse};
use super::search::{run_search, SearchResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub ids: Vec<u32>,
    /// Pinned shows currently known to the catalog, in pin order.
    pub shows: Vec<Show>,
}

#[derive(Debug, Serialize)]
pub struct PinResponse {
    pub id: u32,
    pub pinned: bool,
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSavedSearchRequest {
    pub label: String,
    pub query: String,
    #[serde(default)]
    pub min_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Watchlist
// ============================================================================

async fn watchlist_response(state: &AppState) -> WatchlistResponse {
    let ids = state.watchlist().ids().await;
    let catalog = state.catalog();
    let shows = ids.iter().filter_map(|id| catalog.show(*id)).collect();
    WatchlistResponse { ids, shows }
}

async fn broadcast_watchlist(state: &AppState) {
    let ids = state.watchlist().ids().await;
    state.ws_broadcaster().watchlist_updated(ids);
}

/// GET /api/v1/watchlist
pub async fn get_watchlist(State(state): State<Arc<AppState>>) -> Json<WatchlistResponse> {
    Json(watchlist_response(&state).await)
}

/// POST /api/v1/watchlist/{id}
pub async fn pin_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<PinResponse> {
    let changed = state.watchlist().add(id).await;
    if changed {
        broadcast_watchlist(&state).await;
    }
    Json(PinResponse {
        id,
        pinned: true,
        changed,
    })
}

/// DELETE /api/v1/watchlist/{id}
pub async fn unpin_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<PinResponse> {
    let changed = state.watchlist().remove(id).await;
    if changed {
        broadcast_watchlist(&state).await;
    }
    Json(PinResponse {
        id,
        pinned: false,
        changed,
    })
}

/// POST /api/v1/watchlist/{id}/toggle
pub async fn toggle_pin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<PinResponse> {
    let pinned = state.watchlist().toggle(id).await;
    broadcast_watchlist(&state).await;
    Json(PinResponse {
        id,
        pinned,
        changed: true,
    })
}

/// DELETE /api/v1/watchlist
pub async fn clear_watchlist(State(state): State<Arc<AppState>>) -> StatusCode {
    state.watchlist().clear().await;
    broadcast_watchlist(&state).await;
    info!("Watchlist cleared");
    StatusCode::NO_CONTENT
}

// ============================================================================
// Recently viewed
// ============================================================================

/// GET /api/v1/recently-viewed
pub async fn get_recently_viewed(State(state): State<Arc<AppState>>) -> Json<Vec<Show>> {
    Json(state.recently_viewed().items().await)
}

/// DELETE /api/v1/recently-viewed/{id}
pub async fn remove_recently_viewed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> StatusCode {
    state.recently_viewed().remove(id).await;
    StatusCode::NO_CONTENT
}

/// DELETE /api/v1/recently-viewed
pub async fn clear_recently_viewed(State(state): State<Arc<AppState>>) -> StatusCode {
    state.recently_viewed().clear().await;
    StatusCode::NO_CONTENT
}

// ============================================================================
// Saved searches
// ============================================================================

/// GET /api/v1/saved-searches
pub async fn list_saved_searches(State(state): State<Arc<AppState>>) -> Json<Vec<SavedSearch>> {
    Json(state.saved_searches().entries().await)
}

/// POST /api/v1/saved-searches
pub async fn create_saved_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSavedSearchRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let label = request.label.trim();
    let query = request.query.trim();
    if label.is_empty() || query.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "label and query are required",
        ));
    }

    let id = state
        .saved_searches()
        .add(label, query, request.min_rating)
        .await;
    info!(id = %id, label = %label, "Saved search created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// DELETE /api/v1/saved-searches/{id}
pub async fn delete_saved_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.saved_searches().remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Saved search {} not found", id),
        ))
    }
}

/// DELETE /api/v1/saved-searches
pub async fn clear_saved_searches(State(state): State<Arc<AppState>>) -> StatusCode {
    state.saved_searches().clear().await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/saved-searches/{id}/run
///
/// Re-run a saved search with its stored rating floor.
pub async fn run_saved_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    let entry = state
        .saved_searches()
        .entries()
        .await
        .into_iter()
        .find(|entry| entry.id == id);

    let Some(entry) = entry else {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Saved search {} not found", id),
        ));
    };

    run_search(&state, &entry.query, Some(entry.min_rating))
        .await
        .map(Json)
}
