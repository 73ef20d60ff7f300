//! API integration tests with a mocked TVMaze backend.
//!
//! These tests run the full router in-process with `MockShowApi` and
//! in-memory storage.

mod common;

use axum::http::StatusCode;
use popcorn_core::testing::MemoryStorage;
use popcorn_core::{TvMazeError, RECENTLY_VIEWED_KEY, SAVED_SEARCHES_KEY, WATCHLIST_KEY};
use serde_json::{json, Value};

use common::{fixtures, TestFixture};

async fn seed_two_pages(fixture: &TestFixture) {
    fixture
        .api
        .set_page(
            0,
            vec![
                fixtures::show(1, "Under the Dome", Some(6.5), &["Drama", "Thriller"]),
                fixtures::show(2, "Person of Interest", Some(8.8), &["Action", "Drama"]),
            ],
        )
        .await;
    fixture
        .api
        .set_page(
            1,
            vec![fixtures::show(3, "Bitten", Some(7.4), &["Horror"])],
        )
        .await;
}

fn names(shows: &Value) -> Vec<String> {
    shows
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", json!("ok"));
}

#[tokio::test]
async fn test_config_endpoint_reports_effective_config() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["catalog"]["default_pages"], json!([0, 1]));
    assert_eq!(response.body["tvmaze"]["base_url"], json!("https://api.tvmaze.com"));
}

#[tokio::test]
async fn test_dashboard_fallback_serves_index() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/shows/82").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("<title>Popcorn</title>"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("popcorn_http_requests_total"));
    assert!(response.text.contains("popcorn_collection_size"));
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_load_default_pages_and_list_sorted() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;

    let response = fixture.post_empty("/api/v1/shows/load").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(3));
    assert_json_path!(response.body, "loaded_pages", json!([0, 1]));
    assert_json_path!(response.body, "is_loading", json!(false));
    assert_json_path!(response.body, "error", Value::Null);

    let response = fixture.get("/api/v1/shows").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(
        names(&response.body["shows"]),
        vec!["Person of Interest", "Bitten", "Under the Dome"]
    );
    assert_json_path!(response.body, "total", json!(3));
}

#[tokio::test]
async fn test_load_explicit_pages() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;

    let response = fixture
        .post("/api/v1/shows/load", json!({ "pages": [1] }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(1));
    assert_json_path!(response.body, "loaded_pages", json!([1]));
    assert_eq!(fixture.api.page_requests().await, vec![1]);
}

#[tokio::test]
async fn test_load_empty_page_list_is_noop() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;

    let response = fixture
        .post("/api/v1/shows/load", json!({ "pages": [] }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(0));
    assert_json_path!(response.body, "loaded_pages", json!([]));
    assert!(fixture.api.page_requests().await.is_empty());

    // A body without the field still means the default pages
    let response = fixture.post("/api/v1/shows/load", json!({})).await;
    assert_json_path!(response.body, "loaded_pages", json!([0, 1]));
}

#[tokio::test]
async fn test_load_rejects_malformed_body() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/shows/load", "{not json").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(fixture.api.page_requests().await.is_empty());
}

#[tokio::test]
async fn test_load_failure_is_reported_in_summary() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;
    fixture
        .api
        .set_page_error(1, TvMazeError::RequestFailed("network down".to_string()))
        .await;

    let response = fixture.post_empty("/api/v1/shows/load").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(0));
    assert_json_path!(response.body, "error", json!("network down"));
    assert_json_path!(response.body, "loaded_pages", json!([]));

    let response = fixture.get("/api/v1/shows").await;
    assert_json_path!(response.body, "error", json!("network down"));
}

#[tokio::test]
async fn test_genre_collections() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;
    fixture.post_empty("/api/v1/shows/load").await;

    let response = fixture.get("/api/v1/shows/genres").await;
    assert_status!(response, StatusCode::OK);

    let genres: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["genre"].as_str().unwrap())
        .collect();
    assert_eq!(genres, vec!["Action", "Drama", "Horror", "Thriller"]);

    let drama = &response.body[1]["shows"];
    assert_eq!(names(drama), vec!["Person of Interest", "Under the Dome"]);
}

#[tokio::test]
async fn test_get_show_hydrates_and_records_view() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;
    fixture.post_empty("/api/v1/shows/load").await;
    fixture
        .api
        .add_show(fixtures::full_show(2, "Person of Interest", Some(8.8), &["Action", "Drama"]))
        .await;

    let response = fixture.get("/api/v1/shows/2").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(
        response.body,
        "summary",
        json!("<p>Person of Interest is a show.</p>")
    );
    assert_eq!(fixture.api.show_requests().await, vec![2]);

    // Second view is served from the index
    let response = fixture.get("/api/v1/shows/2").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(fixture.api.show_requests().await, vec![2]);

    let response = fixture.get("/api/v1/recently-viewed").await;
    assert_eq!(names(&response.body), vec!["Person of Interest"]);
}

#[tokio::test]
async fn test_get_unknown_show_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/shows/999").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_json_path!(
        response.body,
        "error",
        json!("TVMaze request failed with status 404")
    );

    let response = fixture.get("/api/v1/recently-viewed").await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_get_show_rejects_bad_ids() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/shows/0").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.get("/api/v1/shows/abc").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    assert!(fixture.api.show_requests().await.is_empty());
}

#[tokio::test]
async fn test_get_cast() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .set_cast(
            1,
            vec![
                fixtures::cast_member(7, "Mike Vogel", "Dale Barbara"),
                fixtures::cast_member(8, "Rachelle Lefevre", "Julia Shumway"),
            ],
        )
        .await;

    let response = fixture.get("/api/v1/shows/1/cast").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 2);
    assert_eq!(response.body[0]["person"]["name"], json!("Mike Vogel"));

    let response = fixture.get("/api/v1/shows/2/cast").await;
    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_json_path!(
        response.body,
        "error",
        json!("TVMaze request failed with status 404")
    );
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_merges_hits_into_catalog() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .set_search_results(
            "girls",
            vec![
                fixtures::search_result(0.9, fixtures::show(139, "Girls", Some(6.7), &["Drama"])),
                fixtures::search_result(
                    0.5,
                    fixtures::show(41734, "Girls Incarcerated", Some(7.2), &["Reality"]),
                ),
            ],
        )
        .await;

    let response = fixture.get("/api/v1/search?q=%20Girls%20").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(2));
    assert_eq!(response.body["results"][0]["show"]["name"], json!("Girls"));
    assert_eq!(fixture.api.search_requests().await, vec!["girls".to_string()]);

    let response = fixture.get("/api/v1/shows").await;
    assert_json_path!(response.body, "total", json!(2));

    // Normalized repeat is served from the cache
    fixture.get("/api/v1/search?q=GIRLS").await;
    assert_eq!(fixture.api.search_requests().await.len(), 1);
}

#[tokio::test]
async fn test_search_min_rating_filter() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .set_search_results(
            "dome",
            vec![
                fixtures::search_result(0.9, fixtures::show(1, "Under the Dome", Some(6.5), &[])),
                fixtures::search_result(0.4, fixtures::show(5, "The Dome", None, &[])),
                fixtures::search_result(0.3, fixtures::show(6, "Dome Life", Some(8.0), &[])),
            ],
        )
        .await;

    let response = fixture.get("/api/v1/search?q=dome&min_rating=7").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(1));
    assert_eq!(response.body["results"][0]["show"]["id"], json!(6));
}

#[tokio::test]
async fn test_search_blank_query_returns_nothing() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/search?q=%20%20").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(0));
    assert_json_path!(response.body, "results", json!([]));

    let response = fixture.get("/api/v1/search").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(0));

    assert!(fixture.api.search_requests().await.is_empty());
}

#[tokio::test]
async fn test_search_failure_is_bad_gateway() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .set_next_error(TvMazeError::RequestFailed("rate limited".to_string()))
        .await;

    let response = fixture.get("/api/v1/search?q=lost").await;
    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_json_path!(response.body, "error", json!("rate limited"));

    // Search failures never land in the catalog error
    let response = fixture.get("/api/v1/shows").await;
    assert_json_path!(response.body, "error", Value::Null);
}

// =============================================================================
// Watchlist
// =============================================================================

#[tokio::test]
async fn test_watchlist_pin_unpin_and_persist() {
    let fixture = TestFixture::new().await;
    seed_two_pages(&fixture).await;
    fixture.post_empty("/api/v1/shows/load").await;

    let response = fixture.post_empty("/api/v1/watchlist/3").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "pinned", json!(true));
    assert_json_path!(response.body, "changed", json!(true));

    let response = fixture.post_empty("/api/v1/watchlist/3").await;
    assert_json_path!(response.body, "changed", json!(false));

    fixture.post_empty("/api/v1/watchlist/1").await;

    let response = fixture.get("/api/v1/watchlist").await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "ids", json!([3, 1]));
    assert_eq!(names(&response.body["shows"]), vec!["Bitten", "Under the Dome"]);

    let raw = fixture.storage.raw(WATCHLIST_KEY).await.unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, json!([3, 1]));

    let response = fixture.delete("/api/v1/watchlist/3").await;
    assert_json_path!(response.body, "pinned", json!(false));
    assert_json_path!(response.body, "changed", json!(true));

    let response = fixture.get("/api/v1/watchlist").await;
    assert_json_path!(response.body, "ids", json!([1]));
}

#[tokio::test]
async fn test_watchlist_toggle_and_clear() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_empty("/api/v1/watchlist/42/toggle").await;
    assert_json_path!(response.body, "pinned", json!(true));

    let response = fixture.post_empty("/api/v1/watchlist/42/toggle").await;
    assert_json_path!(response.body, "pinned", json!(false));

    fixture.post_empty("/api/v1/watchlist/7").await;
    let response = fixture.delete("/api/v1/watchlist").await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let response = fixture.get("/api/v1/watchlist").await;
    assert_json_path!(response.body, "ids", json!([]));
}

#[tokio::test]
async fn test_watchlist_change_is_broadcast() {
    let fixture = TestFixture::new().await;
    let mut rx = fixture.state.ws_broadcaster().subscribe();

    fixture.post_empty("/api/v1/watchlist/9").await;

    let msg = rx.recv().await.unwrap();
    assert_eq!(
        msg,
        popcorn_server::api::WsMessage::WatchlistUpdate { ids: vec![9] }
    );
}

#[tokio::test]
async fn test_collections_load_from_storage() {
    let storage = MemoryStorage::new();
    storage
        .insert_raw(WATCHLIST_KEY, r#"[5, "junk", 8]"#)
        .await;
    storage
        .insert_raw(RECENTLY_VIEWED_KEY, "{not json")
        .await;

    let fixture = TestFixture::with_storage(storage).await;

    let response = fixture.get("/api/v1/watchlist").await;
    assert_json_path!(response.body, "ids", json!([5, 8]));

    let response = fixture.get("/api/v1/recently-viewed").await;
    assert_eq!(response.body, json!([]));
}

// =============================================================================
// Recently viewed
// =============================================================================

#[tokio::test]
async fn test_recently_viewed_order_remove_and_clear() {
    let fixture = TestFixture::new().await;
    for (id, name) in [(1, "Alpha"), (2, "Beta"), (3, "Gamma")] {
        fixture
            .api
            .add_show(fixtures::full_show(id, name, Some(7.0), &[]))
            .await;
    }

    fixture.get("/api/v1/shows/1").await;
    fixture.get("/api/v1/shows/2").await;
    fixture.get("/api/v1/shows/3").await;
    fixture.get("/api/v1/shows/1").await;

    let response = fixture.get("/api/v1/recently-viewed").await;
    assert_eq!(names(&response.body), vec!["Alpha", "Gamma", "Beta"]);

    let response = fixture.delete("/api/v1/recently-viewed/3").await;
    assert_status!(response, StatusCode::NO_CONTENT);
    let response = fixture.get("/api/v1/recently-viewed").await;
    assert_eq!(names(&response.body), vec!["Alpha", "Beta"]);

    fixture.delete("/api/v1/recently-viewed").await;
    let response = fixture.get("/api/v1/recently-viewed").await;
    assert_eq!(response.body, json!([]));
}

// =============================================================================
// Saved searches
// =============================================================================

#[tokio::test]
async fn test_saved_search_lifecycle() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .set_search_results(
            "dome",
            vec![
                fixtures::search_result(0.9, fixtures::show(1, "Under the Dome", Some(6.5), &[])),
                fixtures::search_result(0.3, fixtures::show(6, "Dome Life", Some(8.0), &[])),
            ],
        )
        .await;

    let response = fixture
        .post(
            "/api/v1/saved-searches",
            json!({ "label": "Good domes", "query": "Dome", "min_rating": 7.5 }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();

    let response = fixture.get("/api/v1/saved-searches").await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    assert_eq!(response.body[0]["label"], json!("Good domes"));
    assert_eq!(response.body[0]["minRating"], json!(7.5));

    let raw = fixture.storage.raw(SAVED_SEARCHES_KEY).await.unwrap();
    assert!(raw.contains(&id));

    let response = fixture
        .get(&format!("/api/v1/saved-searches/{}/run", id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total", json!(1));
    assert_eq!(response.body["results"][0]["show"]["name"], json!("Dome Life"));

    let response = fixture
        .delete(&format!("/api/v1/saved-searches/{}", id))
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let response = fixture
        .delete(&format!("/api/v1/saved-searches/{}", id))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_saved_search_requires_label_and_query() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/saved-searches",
            json!({ "label": "  ", "query": "lost" }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.get("/api/v1/saved-searches").await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_saved_searches_newest_first_and_clear() {
    let fixture = TestFixture::new().await;

    fixture
        .post("/api/v1/saved-searches", json!({ "label": "One", "query": "a" }))
        .await;
    fixture
        .post("/api/v1/saved-searches", json!({ "label": "Two", "query": "b" }))
        .await;

    let response = fixture.get("/api/v1/saved-searches").await;
    let labels: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Two", "One"]);

    let response = fixture.delete("/api/v1/saved-searches").await;
    assert_status!(response, StatusCode::NO_CONTENT);
    let response = fixture.get("/api/v1/saved-searches").await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_run_unknown_saved_search() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/saved-searches/nope/run").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}
