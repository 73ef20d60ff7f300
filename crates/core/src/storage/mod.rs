//! Persistent list storage.
//!
//! Collections are stored as JSON arrays under string keys. Reads are
//! forgiving: anything missing, corrupt or oddly shaped comes back as an
//! empty list, and elements that fail validation are dropped. Writes are
//! best effort. Neither direction ever surfaces an error to the caller.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Keys may only contain ASCII letters, digits, '-' and '_'.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Failed to read {key}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {key}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Key-value backend holding raw JSON text.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Raw value stored under `key`, `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Validated array persistence over a [`StorageBackend`].
#[derive(Clone)]
pub struct ListStore {
    backend: Arc<dyn StorageBackend>,
}

impl ListStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Load the array stored under `key`, keeping elements that
    /// deserialize as `T` and pass `is_valid`.
    pub async fn load_array<T, F>(&self, key: &str, is_valid: F) -> Vec<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Nothing stored under '{}'", key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read '{}' from storage: {}", key, e);
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        let elements = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(elements)) => elements,
            Ok(_) => {
                warn!("Stored value for '{}' is not an array, ignoring it", key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to parse '{}' from storage: {}", key, e);
                return Vec::new();
            }
        };

        let total = elements.len();
        let items: Vec<T> = elements
            .into_iter()
            .filter_map(|value| serde_json::from_value::<T>(value).ok())
            .filter(|item| is_valid(item))
            .collect();

        if items.len() < total {
            debug!(
                "Dropped {} invalid entries from '{}'",
                total - items.len(),
                key
            );
        }
        items
    }

    /// Persist `items` under `key`. Failures are logged, never returned.
    pub async fn save_array<T: Serialize>(&self, key: &str, items: &[T]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.backend.set(key, &json).await {
            warn!("Failed to persist '{}': {}", key, e);
        }
    }

    /// Drop whatever is stored under `key`. Failures are logged, never returned.
    pub async fn remove_array(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            warn!("Failed to remove '{}': {}", key, e);
        }
    }
}
