//! Most recently opened shows.

use tokio::sync::RwLock;
use tracing::debug;

use crate::storage::ListStore;
use crate::tvmaze::Show;

/// Storage key of the recently viewed list.
pub const RECENTLY_VIEWED_KEY: &str = "popcorn-recently-viewed";

/// Maximum number of shows kept.
pub const MAX_RECENT: usize = 12;

fn is_valid(show: &Show) -> bool {
    show.id > 0
}

/// Recently viewed shows, newest first.
pub struct RecentlyViewed {
    store: ListStore,
    items: RwLock<Vec<Show>>,
}

impl RecentlyViewed {
    /// Load the list from storage.
    pub async fn load(store: ListStore) -> Self {
        let items = store.load_array(RECENTLY_VIEWED_KEY, is_valid).await;
        debug!("Loaded {} recently viewed shows", items.len());
        Self {
            store,
            items: RwLock::new(items),
        }
    }

    pub async fn items(&self) -> Vec<Show> {
        self.items.read().await.clone()
    }

    pub async fn has_any(&self) -> bool {
        !self.items.read().await.is_empty()
    }

    /// Move `show` to the front, dropping any older entry with its id.
    pub async fn add(&self, show: Show) {
        let mut items = self.items.write().await;
        items.retain(|item| item.id != show.id);
        items.insert(0, show);
        items.truncate(MAX_RECENT);
        self.store.save_array(RECENTLY_VIEWED_KEY, items.as_slice()).await;
    }

    pub async fn remove(&self, id: u32) {
        let mut items = self.items.write().await;
        items.retain(|item| item.id != id);
        self.store.save_array(RECENTLY_VIEWED_KEY, items.as_slice()).await;
    }

    pub async fn clear(&self) {
        let mut items = self.items.write().await;
        items.clear();
        self.store.remove_array(RECENTLY_VIEWED_KEY).await;
    }

    /// Discard in-memory state and re-read storage.
    pub async fn reload(&self) {
        let fresh = self.store.load_array(RECENTLY_VIEWED_KEY, is_valid).await;
        let mut items = self.items.write().await;
        *items = fresh;
        self.store.save_array(RECENTLY_VIEWED_KEY, items.as_slice()).await;
    }
}
