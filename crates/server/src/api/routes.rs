use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::{collections, handlers, middleware::metrics_middleware, search, shows, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let dashboard_dir = state.config().server.dashboard_dir.clone();

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog
        .route("/shows", get(shows::list_shows))
        .route("/shows/genres", get(shows::list_genres))
        .route("/shows/load", post(shows::load_shows))
        .route("/shows/{id}", get(shows::get_show))
        .route("/shows/{id}/cast", get(shows::get_cast))
        .route("/search", get(search::search))
        // Watchlist
        .route(
            "/watchlist",
            get(collections::get_watchlist).delete(collections::clear_watchlist),
        )
        .route(
            "/watchlist/{id}",
            post(collections::pin_show).delete(collections::unpin_show),
        )
        .route("/watchlist/{id}/toggle", post(collections::toggle_pin))
        // Recently viewed
        .route(
            "/recently-viewed",
            get(collections::get_recently_viewed).delete(collections::clear_recently_viewed),
        )
        .route(
            "/recently-viewed/{id}",
            axum::routing::delete(collections::remove_recently_viewed),
        )
        // Saved searches
        .route(
            "/saved-searches",
            get(collections::list_saved_searches)
                .post(collections::create_saved_search)
                .delete(collections::clear_saved_searches),
        )
        .route(
            "/saved-searches/{id}",
            axum::routing::delete(collections::delete_saved_search),
        )
        .route("/saved-searches/{id}/run", get(collections::run_saved_search))
        // Real-time updates
        .route("/ws", get(ws::ws_handler))
        .with_state(state.clone());

    // Serve dashboard with SPA fallback
    let index_path = dashboard_dir.join("index.html");
    let serve_dir = ServeDir::new(&dashboard_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
