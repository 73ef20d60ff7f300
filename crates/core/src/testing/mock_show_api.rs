//! Mock show API for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::tvmaze::{CastMember, SearchResult, Show, ShowApi, TvMazeError};

/// A recorded API call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedShowQuery {
    ShowsPage { page: u32 },
    Show { id: u32 },
    Search { query: String },
    Cast { id: u32 },
}

/// Mock implementation of the [`ShowApi`] trait.
///
/// Provides controllable behavior for testing:
/// - Return configured pages, shows, search hits and cast lists
/// - Record every call for assertions
/// - Inject one-shot or per-page failures
/// - Delay responses, honouring cancellation while waiting
#[derive(Clone)]
pub struct MockShowApi {
    /// Shows per page.
    pages: Arc<RwLock<HashMap<u32, Vec<Show>>>>,
    /// Detail responses by show id.
    shows: Arc<RwLock<HashMap<u32, Show>>>,
    /// Search hits by query, matched exactly.
    searches: Arc<RwLock<HashMap<String, Vec<SearchResult>>>>,
    /// Cast lists by show id.
    cast: Arc<RwLock<HashMap<u32, Vec<CastMember>>>>,
    /// Recorded calls.
    queries: Arc<RwLock<Vec<RecordedShowQuery>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<TvMazeError>>>,
    /// Pages that always fail.
    page_errors: Arc<RwLock<HashMap<u32, TvMazeError>>>,
    /// Artificial latency applied to every call.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockShowApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockShowApi {
    /// Create a new empty mock.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            shows: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(HashMap::new())),
            cast: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            page_errors: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Response Configuration
    // =========================================================================

    /// Set the shows returned for a page. Unset pages return no shows.
    pub async fn set_page(&self, page: u32, shows: Vec<Show>) {
        self.pages.write().await.insert(page, shows);
    }

    /// Set the detail response for a show.
    pub async fn add_show(&self, show: Show) {
        self.shows.write().await.insert(show.id, show);
    }

    /// Set the hits returned for a query.
    pub async fn set_search_results(&self, query: &str, results: Vec<SearchResult>) {
        self.searches
            .write()
            .await
            .insert(query.to_string(), results);
    }

    /// Set the cast returned for a show.
    pub async fn set_cast(&self, id: u32, cast: Vec<CastMember>) {
        self.cast.write().await.insert(id, cast);
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Remove the response delay.
    pub async fn clear_delay(&self) {
        *self.delay.write().await = None;
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_queries(&self) -> Vec<RecordedShowQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of calls performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    /// Pages requested, in call order.
    pub async fn page_requests(&self) -> Vec<u32> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedShowQuery::ShowsPage { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Show ids requested through the detail endpoint, in call order.
    pub async fn show_requests(&self) -> Vec<u32> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedShowQuery::Show { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Search queries received, in call order.
    pub async fn search_requests(&self) -> Vec<String> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedShowQuery::Search { query } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: TvMazeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Make every request for `page` fail with `error`.
    pub async fn set_page_error(&self, page: u32, error: TvMazeError) {
        self.page_errors.write().await.insert(page, error);
    }

    /// Clear all per-page failures.
    pub async fn clear_page_errors(&self) {
        self.page_errors.write().await.clear();
    }

    async fn take_error(&self) -> Option<TvMazeError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, query: RecordedShowQuery) {
        self.queries.write().await.push(query);
    }

    /// Record the call, wait out the delay and apply injected failures.
    async fn begin(
        &self,
        query: RecordedShowQuery,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), TvMazeError> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(TvMazeError::Cancelled);
        }

        self.record(query).await;

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(TvMazeError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                },
                None => tokio::time::sleep(delay).await,
            }
        }

        match self.take_error().await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn not_found() -> TvMazeError {
    TvMazeError::RequestFailed("TVMaze request failed with status 404".to_string())
}

#[async_trait]
impl ShowApi for MockShowApi {
    async fn fetch_shows_page(
        &self,
        page: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Show>, TvMazeError> {
        self.begin(RecordedShowQuery::ShowsPage { page }, cancel)
            .await?;

        if let Some(err) = self.page_errors.read().await.get(&page) {
            return Err(err.clone());
        }

        Ok(self
            .pages
            .read()
            .await
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_show(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Show, TvMazeError> {
        self.begin(RecordedShowQuery::Show { id }, cancel).await?;

        self.shows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn search_shows(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>, TvMazeError> {
        self.begin(
            RecordedShowQuery::Search {
                query: query.to_string(),
            },
            cancel,
        )
        .await?;

        Ok(self
            .searches
            .read()
            .await
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_cast(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<CastMember>, TvMazeError> {
        self.begin(RecordedShowQuery::Cast { id }, cancel).await?;

        self.cast
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(not_found)
    }
}
