//! TVMaze REST API client.
//!
//! TVMaze needs no API key. Every response is JSON; anything outside the
//! 2xx range is reported as a failed request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::{CastMember, SearchResult, Show};
use super::{ShowApi, TvMazeError};
use crate::metrics::{TVMAZE_REQUESTS_TOTAL, TVMAZE_REQUEST_DURATION};

/// Public TVMaze API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// TVMaze client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvMazeConfig {
    /// Base URL (default: https://api.tvmaze.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TvMazeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// TVMaze API client.
#[derive(Debug, Clone)]
pub struct TvMazeClient {
    client: Client,
    base_url: String,
}

impl TvMazeClient {
    /// Create a new TVMaze client.
    pub fn new(config: TvMazeConfig) -> Result<Self, TvMazeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                TvMazeError::RequestFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, TvMazeError> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            TVMAZE_REQUESTS_TOTAL
                .with_label_values(&[endpoint, "cancelled"])
                .inc();
            return Err(TvMazeError::Cancelled);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("TVMaze request: endpoint={}, url={}", endpoint, url);

        let timer = TVMAZE_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .start_timer();

        let request = self.execute::<T>(&url);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(TvMazeError::Cancelled),
                result = request => result,
            },
            None => request.await,
        };

        timer.observe_duration();
        let outcome = match &result {
            Ok(_) => "ok",
            Err(TvMazeError::Cancelled) => "cancelled",
            Err(_) => "error",
        };
        TVMAZE_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();

        if let Err(e) = &result {
            debug!("TVMaze request failed: endpoint={}, error={}", endpoint, e);
        }

        result
    }

    async fn execute<T: DeserializeOwned>(&self, url: &str) -> Result<T, TvMazeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|e| TvMazeError::InvalidResponse(e.to_string()))
    }
}

fn status_error(status: u16) -> TvMazeError {
    TvMazeError::RequestFailed(format!("TVMaze request failed with status {}", status))
}

fn transport_error(err: reqwest::Error) -> TvMazeError {
    if let Some(status) = err.status() {
        return status_error(status.as_u16());
    }

    let message = err.to_string();
    if message.trim().is_empty() {
        TvMazeError::RequestFailed("TVMaze request failed.".to_string())
    } else {
        TvMazeError::RequestFailed(message)
    }
}

fn check_id(id: u32) -> Result<(), TvMazeError> {
    if id == 0 {
        return Err(TvMazeError::RequestFailed(
            "Show id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl ShowApi for TvMazeClient {
    async fn fetch_shows_page(
        &self,
        page: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Show>, TvMazeError> {
        self.get_json("shows_page", &format!("/shows?page={}", page), cancel)
            .await
    }

    async fn fetch_show(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Show, TvMazeError> {
        check_id(id)?;
        self.get_json("show", &format!("/shows/{}", id), cancel).await
    }

    async fn search_shows(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchResult>, TvMazeError> {
        let path = format!("/search/shows?q={}", urlencoding::encode(query));
        self.get_json("search", &path, cancel).await
    }

    async fn fetch_cast(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<CastMember>, TvMazeError> {
        check_id(id)?;
        self.get_json("cast", &format!("/shows/{}/cast", id), cancel)
            .await
    }
}
