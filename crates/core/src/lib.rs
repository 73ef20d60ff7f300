pub mod catalog;
pub mod collections;
pub mod config;
pub mod metrics;
pub mod storage;
pub mod testing;
pub mod tvmaze;

pub use catalog::{
    filter_by_min_rating, group_by_genre, normalize_query, sort_shows_by_rating, CatalogSnapshot,
    GenreCollection, ShowCatalog, DEFAULT_PAGES,
};
pub use collections::{
    RecentlyViewed, SavedSearch, SavedSearches, Watchlist, MAX_RECENT, RECENTLY_VIEWED_KEY,
    SAVED_SEARCHES_KEY, WATCHLIST_KEY,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    ServerConfig, StorageConfig,
};
pub use storage::{FileStorage, ListStore, MemoryStorage, StorageBackend, StorageError};
pub use tvmaze::{
    CastMember, SearchResult, Show, ShowApi, TvMazeClient, TvMazeConfig, TvMazeError,
};
