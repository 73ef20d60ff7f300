//! Catalog state engine.
//!
//! The catalog owns the canonical show index and everything derived from it.
//! It is fed by page loads, detail fetches and searches against a
//! [`ShowApi`](crate::tvmaze::ShowApi) and publishes a fresh
//! [`CatalogSnapshot`] whenever the observable state changes.

mod engine;
mod views;

pub use engine::{normalize_query, ShowCatalog, DEFAULT_PAGES};
pub use views::{compare_by_rating, filter_by_min_rating, group_by_genre, sort_shows_by_rating};

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::tvmaze::Show;

/// All shows carrying one genre label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreCollection {
    pub genre: String,
    pub shows: Vec<Show>,
}

/// Immutable view of the catalog at one point in time.
///
/// Cloning is cheap. Snapshots published without an index change share the
/// same show list and the same lazily built genre grouping.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    shows: Arc<[Show]>,
    genres: Arc<OnceLock<Arc<[GenreCollection]>>>,
    is_loading: bool,
    error: Option<String>,
}

impl CatalogSnapshot {
    pub(crate) fn new(
        shows: Arc<[Show]>,
        genres: Arc<OnceLock<Arc<[GenreCollection]>>>,
        is_loading: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            shows,
            genres,
            is_loading,
            error,
        }
    }

    /// Every indexed show in catalog order.
    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    /// Shared handle to the ordered show list.
    pub fn shows_arc(&self) -> Arc<[Show]> {
        Arc::clone(&self.shows)
    }

    /// Genre groupings, built on first access and reused until the index changes.
    pub fn genre_collections(&self) -> Arc<[GenreCollection]> {
        Arc::clone(
            self.genres
                .get_or_init(|| group_by_genre(&self.shows).into()),
        )
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed load or detail fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    /// Whether both snapshots share the same show list allocation.
    pub fn same_shows(&self, other: &CatalogSnapshot) -> bool {
        Arc::ptr_eq(&self.shows, &other.shows)
    }
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self::new(Arc::from(Vec::new()), Arc::default(), false, None)
    }
}
