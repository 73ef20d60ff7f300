//! User collections persisted through [`ListStore`](crate::storage::ListStore).
//!
//! Each collection loads its contents once on construction, keeps them in
//! memory and writes the whole list back after every change.

mod recently_viewed;
mod saved_searches;
mod watchlist;

pub use recently_viewed::{RecentlyViewed, MAX_RECENT, RECENTLY_VIEWED_KEY};
pub use saved_searches::{SavedSearch, SavedSearches, SAVED_SEARCHES_KEY};
pub use watchlist::{Watchlist, WATCHLIST_KEY};
