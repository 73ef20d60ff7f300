use std::sync::Arc;

use popcorn_core::{
    Config, ListStore, RecentlyViewed, SavedSearches, ShowApi, ShowCatalog, StorageBackend,
    Watchlist,
};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<ShowCatalog>,
    watchlist: Watchlist,
    recently_viewed: RecentlyViewed,
    saved_searches: SavedSearches,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    /// Build the catalog over `api` and load the collections from `storage`.
    pub async fn build(
        config: Config,
        api: Arc<dyn ShowApi>,
        storage: Arc<dyn StorageBackend>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        let catalog = Arc::new(
            ShowCatalog::new(api).with_default_pages(config.catalog.default_pages.clone()),
        );
        let store = ListStore::new(storage);

        Self {
            config,
            catalog,
            watchlist: Watchlist::load(store.clone()).await,
            recently_viewed: RecentlyViewed::load(store.clone()).await,
            saved_searches: SavedSearches::load(store).await,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<ShowCatalog> {
        &self.catalog
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn recently_viewed(&self) -> &RecentlyViewed {
        &self.recently_viewed
    }

    pub fn saved_searches(&self) -> &SavedSearches {
        &self.saved_searches
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
