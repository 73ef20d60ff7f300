//! The show catalog: canonical index, caches and load bookkeeping.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures::future::{try_join_all, BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::views::sort_shows_by_rating;
use super::{CatalogSnapshot, GenreCollection};
use crate::metrics::{CATALOG_CACHE_LOOKUPS, CATALOG_INDEX_SIZE};
use crate::tvmaze::{SearchResult, Show, ShowApi, TvMazeError};

/// Pages loaded by [`ShowCatalog::load_default_pages`] unless configured otherwise.
pub const DEFAULT_PAGES: [u32; 5] = [0, 1, 2, 3, 4];

const UNKNOWN_ERROR: &str = "Unknown error";

type DetailFetch = Shared<BoxFuture<'static, Result<Show, TvMazeError>>>;

/// Normalize a search query to its cache key: trimmed and lowercased.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn error_message(err: &TvMazeError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

struct CatalogState {
    index: HashMap<u32, Show>,
    loaded_pages: BTreeSet<u32>,
    search_cache: HashMap<String, Arc<[SearchResult]>>,
    is_loading: bool,
    error: Option<String>,
    /// Bumped by every reset; work started under an older generation is dropped.
    generation: u64,
    sorted: Arc<[Show]>,
    genres: Arc<OnceLock<Arc<[GenreCollection]>>>,
}

impl CatalogState {
    fn new(generation: u64) -> Self {
        Self {
            index: HashMap::new(),
            loaded_pages: BTreeSet::new(),
            search_cache: HashMap::new(),
            is_loading: false,
            error: None,
            generation,
            sorted: Arc::from(Vec::new()),
            genres: Arc::default(),
        }
    }

    /// Rebuild the ordered list after an index change.
    fn resort(&mut self) {
        self.sorted = sort_shows_by_rating(self.index.values()).into();
        self.genres = Arc::default();
        CATALOG_INDEX_SIZE.set(self.index.len() as i64);
    }

    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::new(
            Arc::clone(&self.sorted),
            Arc::clone(&self.genres),
            self.is_loading,
            self.error.clone(),
        )
    }
}

/// Clears the loading flag if a page load is dropped before it finishes.
struct LoadingGuard<'a> {
    catalog: &'a ShowCatalog,
    generation: u64,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.catalog.lock_state();
        if state.generation == self.generation && state.is_loading {
            debug!("Page load abandoned, clearing loading flag");
            state.is_loading = false;
            self.catalog.publish(&state);
        }
    }
}

/// Unregisters an in-flight detail fetch when its caller finishes or is
/// dropped, so an abandoned request is never joined later.
struct PendingDetail<'a> {
    catalog: &'a ShowCatalog,
    id: u32,
    fetch: DetailFetch,
}

impl Drop for PendingDetail<'_> {
    fn drop(&mut self) {
        self.catalog.finish_detail_fetch(self.id, &self.fetch);
    }
}

/// Show catalog backed by a [`ShowApi`].
///
/// All state sits behind one mutex that is never held across an await, so
/// every mutation is applied atomically with respect to other operations.
/// Observers follow changes through [`ShowCatalog::subscribe`].
pub struct ShowCatalog {
    api: Arc<dyn ShowApi>,
    default_pages: Vec<u32>,
    state: Mutex<CatalogState>,
    pending_details: Mutex<HashMap<u32, DetailFetch>>,
    snapshot_tx: watch::Sender<CatalogSnapshot>,
}

impl ShowCatalog {
    /// Create an empty catalog.
    pub fn new(api: Arc<dyn ShowApi>) -> Self {
        let (snapshot_tx, _) = watch::channel(CatalogSnapshot::default());
        Self {
            api,
            default_pages: DEFAULT_PAGES.to_vec(),
            state: Mutex::new(CatalogState::new(0)),
            pending_details: Mutex::new(HashMap::new()),
            snapshot_tx,
        }
    }

    /// Override the pages loaded by [`ShowCatalog::load_default_pages`].
    pub fn with_default_pages(mut self, pages: Vec<u32>) -> Self {
        self.default_pages = pages;
        self
    }

    /// The backend this catalog reads from.
    pub fn api(&self) -> &Arc<dyn ShowApi> {
        &self.api
    }

    pub fn default_pages(&self) -> &[u32] {
        &self.default_pages
    }

    fn lock_state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<u32, DetailFetch>> {
        self.pending_details
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &CatalogState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    // ========================================================================
    // Page loading
    // ========================================================================

    /// Load the configured default pages.
    pub async fn load_default_pages(&self) {
        let pages = self.default_pages.clone();
        self.load_shows(&pages).await;
    }

    /// Load every page in `pages` that has not been loaded yet.
    ///
    /// Does nothing when all pages are loaded or another load is running.
    /// Pages are fetched concurrently and merged only if all of them
    /// succeed; on the first failure the error is recorded and nothing from
    /// the batch is kept. Shows already in the index are never replaced.
    pub async fn load_shows(&self, pages: &[u32]) {
        let (pending, generation) = {
            let mut state = self.lock_state();
            let mut pending: Vec<u32> = pages
                .iter()
                .copied()
                .filter(|page| !state.loaded_pages.contains(page))
                .collect();
            pending.sort_unstable();
            pending.dedup();

            if pending.is_empty() {
                debug!("All requested pages already loaded: {:?}", pages);
                return;
            }
            if state.is_loading {
                debug!("Page load already in progress, skipping {:?}", pending);
                return;
            }

            state.is_loading = true;
            state.error = None;
            self.publish(&state);
            (pending, state.generation)
        };

        let mut guard = LoadingGuard {
            catalog: self,
            generation,
            armed: true,
        };

        info!("Loading show pages {:?}", pending);
        let result = try_join_all(
            pending
                .iter()
                .map(|&page| self.api.fetch_shows_page(page, None)),
        )
        .await;

        guard.armed = false;
        let mut state = self.lock_state();
        if state.generation != generation {
            debug!("Catalog reset during page load, discarding pages {:?}", pending);
            return;
        }

        match result {
            Ok(responses) => {
                state.loaded_pages.extend(pending.iter().copied());

                let mut added = 0usize;
                for show in responses.into_iter().flatten() {
                    if let Entry::Vacant(slot) = state.index.entry(show.id) {
                        slot.insert(show);
                        added += 1;
                    }
                }
                if added > 0 {
                    state.resort();
                }
                info!(
                    "Loaded pages {:?}: {} new shows, {} indexed",
                    pending,
                    added,
                    state.index.len()
                );
            }
            Err(e) => {
                let message = error_message(&e);
                warn!("Failed to load pages {:?}: {}", pending, message);
                state.error = Some(message);
            }
        }

        state.is_loading = false;
        self.publish(&state);
    }

    // ========================================================================
    // Show details
    // ========================================================================

    /// Make sure the full representation of show `id` is indexed.
    ///
    /// Returns the cached show without a request when it is already full.
    /// Otherwise fetches it, stores it and returns it. Concurrent calls for
    /// the same id share one request. When the fetch fails the error is
    /// recorded and whatever the index held for `id` is returned.
    pub async fn ensure_show(&self, id: u32) -> Option<Show> {
        let (existing, generation) = {
            let state = self.lock_state();
            (state.index.get(&id).cloned(), state.generation)
        };

        if let Some(show) = existing.as_ref().filter(|show| show.is_full()) {
            CATALOG_CACHE_LOOKUPS
                .with_label_values(&["detail", "hit"])
                .inc();
            debug!("Show {} already full in index", id);
            return Some(show.clone());
        }
        CATALOG_CACHE_LOOKUPS
            .with_label_values(&["detail", "miss"])
            .inc();

        let fetch = self.detail_fetch(id);
        let pending = PendingDetail {
            catalog: self,
            id,
            fetch: fetch.clone(),
        };
        let result = fetch.await;
        drop(pending);

        let mut state = self.lock_state();
        let current = state.generation == generation;
        match result {
            Ok(show) => {
                if current {
                    state.index.insert(show.id, show.clone());
                    state.resort();
                    self.publish(&state);
                } else {
                    debug!("Catalog reset during fetch of show {}, not indexing", id);
                }
                Some(show)
            }
            Err(e) => {
                let message = error_message(&e);
                warn!("Failed to fetch show {}: {}", id, message);
                if current {
                    state.error = Some(message);
                    self.publish(&state);
                    state.index.get(&id).cloned().or(existing)
                } else {
                    existing
                }
            }
        }
    }

    fn detail_fetch(&self, id: u32) -> DetailFetch {
        let mut pending = self.lock_pending();
        if let Some(fetch) = pending.get(&id) {
            debug!("Joining in-flight fetch of show {}", id);
            return fetch.clone();
        }

        let api = Arc::clone(&self.api);
        let fetch = async move { api.fetch_show(id, None).await }
            .boxed()
            .shared();
        pending.insert(id, fetch.clone());
        fetch
    }

    fn finish_detail_fetch(&self, id: u32, fetch: &DetailFetch) {
        let mut pending = self.lock_pending();
        if pending.get(&id).is_some_and(|f| f.ptr_eq(fetch)) {
            pending.remove(&id);
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Search shows by title.
    ///
    /// Queries are normalized with [`normalize_query`]; a blank query yields
    /// no results without a request. Results are cached per normalized
    /// query for the life of the catalog. Every hit is merged into the
    /// index, overlaying what was there. Errors, cancellation included, are
    /// returned to the caller and leave the catalog error untouched.
    pub async fn search_shows(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Arc<[SearchResult]>, TvMazeError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }

        let generation = {
            let state = self.lock_state();
            if let Some(cached) = state.search_cache.get(&normalized) {
                CATALOG_CACHE_LOOKUPS
                    .with_label_values(&["search", "hit"])
                    .inc();
                debug!("Search cache hit: query='{}'", normalized);
                return Ok(Arc::clone(cached));
            }
            state.generation
        };
        CATALOG_CACHE_LOOKUPS
            .with_label_values(&["search", "miss"])
            .inc();

        debug!("Searching TVMaze: query='{}'", normalized);
        let fetched: Arc<[SearchResult]> = self.api.search_shows(&normalized, cancel).await?.into();

        let mut state = self.lock_state();
        if state.generation != generation {
            debug!("Catalog reset during search '{}', not caching", normalized);
            return Ok(fetched);
        }

        // A concurrent search for the same query may have landed first.
        let results = Arc::clone(
            state
                .search_cache
                .entry(normalized)
                .or_insert(fetched),
        );

        for hit in results.iter() {
            match state.index.entry(hit.show.id) {
                Entry::Occupied(mut slot) => slot.get_mut().merge_from(&hit.show),
                Entry::Vacant(slot) => {
                    slot.insert(hit.show.clone());
                }
            }
        }
        state.resort();
        self.publish(&state);

        Ok(results)
    }

    // ========================================================================
    // Reset and accessors
    // ========================================================================

    /// Drop all state. Operations still in flight are discarded when they finish.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        let generation = state.generation + 1;
        *state = CatalogState::new(generation);
        CATALOG_INDEX_SIZE.set(0);
        self.lock_pending().clear();
        info!("Catalog reset");
        self.publish(&state);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Every indexed show in catalog order.
    pub fn all_shows(&self) -> Arc<[Show]> {
        self.snapshot().shows_arc()
    }

    pub fn genre_collections(&self) -> Arc<[GenreCollection]> {
        self.snapshot().genre_collections()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    /// Indexed show by id, lean or full.
    pub fn show(&self, id: u32) -> Option<Show> {
        self.lock_state().index.get(&id).cloned()
    }

    pub fn loaded_pages(&self) -> Vec<u32> {
        self.lock_state().loaded_pages.iter().copied().collect()
    }

    /// Cached search results for `query`, if any.
    pub fn cached_search(&self, query: &str) -> Option<Arc<[SearchResult]>> {
        self.lock_state()
            .search_cache
            .get(&normalize_query(query))
            .cloned()
    }

    pub fn cached_query_count(&self) -> usize {
        self.lock_state().search_cache.len()
    }

    pub fn index_len(&self) -> usize {
        self.lock_state().index.len()
    }
}
