//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock TVMaze backend and in-memory storage, so the full router can
//! be exercised without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use popcorn_core::testing::{MemoryStorage, MockShowApi};
use popcorn_core::{Config, ShowApi, StorageBackend};
use popcorn_server::api::WsBroadcaster;
use popcorn_server::state::AppState;

/// Re-export fixtures for test convenience
pub use popcorn_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list_shows() {
///     let fixture = TestFixture::new().await;
///     fixture.api.set_page(0, vec![fixtures::show(1, "Alpha", Some(8.0), &[])]).await;
///
///     let response = fixture.post_empty("/api/v1/shows/load").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared application state
    pub state: Arc<AppState>,
    /// Mock TVMaze backend - configure pages, details, searches and cast
    pub api: Arc<MockShowApi>,
    /// In-memory storage behind the collections
    pub storage: MemoryStorage,
    /// Temporary directory holding the dashboard files
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with empty storage.
    pub async fn new() -> Self {
        Self::with_storage(MemoryStorage::new()).await
    }

    /// Create a test fixture over pre-populated storage.
    pub async fn with_storage(storage: MemoryStorage) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dashboard_dir = temp_dir.path().join("dashboard");
        std::fs::create_dir_all(&dashboard_dir).expect("Failed to create dashboard dir");
        std::fs::write(
            dashboard_dir.join("index.html"),
            "<!doctype html><title>Popcorn</title>",
        )
        .expect("Failed to write index.html");

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.server.dashboard_dir = dashboard_dir;
        config.catalog.default_pages = vec![0, 1];
        config.catalog.preload = false;

        let api = Arc::new(MockShowApi::new());
        let state = Arc::new(
            AppState::build(
                config,
                Arc::clone(&api) as Arc<dyn ShowApi>,
                Arc::new(storage.clone()) as Arc<dyn StorageBackend>,
                WsBroadcaster::default(),
            )
            .await,
        );

        let router = popcorn_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            api,
            storage,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert response status with a helpful error message.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
