//! TVMaze catalog integration.
//!
//! This module provides the client the catalog engine uses to page through
//! shows, hydrate show details, search by title and fetch cast lists.

mod client;
mod types;

pub use client::{TvMazeClient, TvMazeConfig, DEFAULT_BASE_URL};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur when talking to TVMaze.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TvMazeError {
    /// Transport or HTTP failure. The message is shown to users as-is.
    #[error("{0}")]
    RequestFailed(String),

    /// The caller fired the cancellation token. Never rewrapped, so callers
    /// can tell a superseded request from a real failure.
    #[error("Request cancelled")]
    Cancelled,

    /// The payload did not match the expected schema.
    #[error("Unexpected TVMaze response: {0}")]
    InvalidResponse(String),
}

impl TvMazeError {
    /// Whether this error only means the caller gave up on the request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TvMazeError::Cancelled)
    }
}

/// Trait for show catalog backends.
///
/// Implemented by [`TvMazeClient`] and by the mock in [`crate::testing`].
/// Every call accepts an optional cancellation token; a fired token must
/// surface as [`TvMazeError::Cancelled`].
#[async_trait]
pub trait ShowApi: Send + Sync {
    /// Fetch one page of the show index.
    async fn fetch_shows_page(
        &self,
        page: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Show>, TvMazeError>;

    /// Fetch the full representation of a show.
    async fn fetch_show(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Show, TvMazeError>;

    /// Search shows by free-text query.
    async fn search_shows(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>, TvMazeError>;

    /// Fetch the cast of a show.
    async fn fetch_cast(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<CastMember>, TvMazeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_displays_bare_message() {
        let err = TvMazeError::RequestFailed("network down".to_string());
        assert_eq!(err.to_string(), "network down");
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_is_distinguishable() {
        assert!(TvMazeError::Cancelled.is_cancelled());
        assert_ne!(
            TvMazeError::Cancelled,
            TvMazeError::RequestFailed("Request cancelled".to_string())
        );
    }
}
