//! Pinned show ids.

use tokio::sync::RwLock;
use tracing::debug;

use crate::storage::ListStore;

/// Storage key of the watchlist.
pub const WATCHLIST_KEY: &str = "popcorn-watchlist";

/// Show ids the user pinned, in pin order.
pub struct Watchlist {
    store: ListStore,
    ids: RwLock<Vec<u32>>,
}

impl Watchlist {
    /// Load the watchlist from storage.
    pub async fn load(store: ListStore) -> Self {
        let ids = store.load_array(WATCHLIST_KEY, |_: &u32| true).await;
        debug!("Loaded watchlist with {} ids", ids.len());
        Self {
            store,
            ids: RwLock::new(ids),
        }
    }

    pub async fn ids(&self) -> Vec<u32> {
        self.ids.read().await.clone()
    }

    pub async fn is_pinned(&self, id: u32) -> bool {
        self.ids.read().await.contains(&id)
    }

    /// Pin `id` if absent, unpin it otherwise. Returns whether it is now pinned.
    pub async fn toggle(&self, id: u32) -> bool {
        let mut ids = self.ids.write().await;
        let pinned = if ids.contains(&id) {
            ids.retain(|&value| value != id);
            false
        } else {
            ids.push(id);
            true
        };
        self.store.save_array(WATCHLIST_KEY, ids.as_slice()).await;
        pinned
    }

    /// Pin `id`. Returns false, without writing, if it was already pinned.
    pub async fn add(&self, id: u32) -> bool {
        let mut ids = self.ids.write().await;
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        self.store.save_array(WATCHLIST_KEY, ids.as_slice()).await;
        true
    }

    /// Unpin `id`. Returns false, without writing, if it was not pinned.
    pub async fn remove(&self, id: u32) -> bool {
        let mut ids = self.ids.write().await;
        if !ids.contains(&id) {
            return false;
        }
        ids.retain(|&value| value != id);
        self.store.save_array(WATCHLIST_KEY, ids.as_slice()).await;
        true
    }

    pub async fn clear(&self) {
        let mut ids = self.ids.write().await;
        ids.clear();
        self.store.remove_array(WATCHLIST_KEY).await;
    }
}
