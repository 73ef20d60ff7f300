//! Named search presets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::storage::ListStore;

/// Storage key of the saved searches.
pub const SAVED_SEARCHES_KEY: &str = "popcorn-saved-searches";

/// A search the user saved for later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub label: String,
    pub query: String,
    pub min_rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Saved searches, newest first.
pub struct SavedSearches {
    store: ListStore,
    entries: RwLock<Vec<SavedSearch>>,
}

impl SavedSearches {
    /// Load saved searches from storage.
    pub async fn load(store: ListStore) -> Self {
        let entries = store
            .load_array(SAVED_SEARCHES_KEY, |entry: &SavedSearch| !entry.id.is_empty())
            .await;
        Self {
            store,
            entries: RwLock::new(entries),
        }
    }

    pub async fn entries(&self) -> Vec<SavedSearch> {
        self.entries.read().await.clone()
    }

    /// Save a search and return its generated id.
    pub async fn add(&self, label: &str, query: &str, min_rating: f64) -> String {
        let entry = SavedSearch {
            id: Uuid::new_v4().to_string(),
            label: label.to_string(),
            query: query.to_string(),
            min_rating,
            created_at: Utc::now(),
        };
        let id = entry.id.clone();

        let mut entries = self.entries.write().await;
        entries.insert(0, entry);
        self.store.save_array(SAVED_SEARCHES_KEY, entries.as_slice()).await;
        id
    }

    /// Remove the search with `id`. Returns whether one was removed.
    pub async fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return false;
        }
        self.store.save_array(SAVED_SEARCHES_KEY, entries.as_slice()).await;
        true
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.store.remove_array(SAVED_SEARCHES_KEY).await;
    }
}
