mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use silver_price_backend::router::build_router;
use tower::ServiceExt;

use crate::common::{
    memory_storage, news_page_html, price_table_html, sqlite_storage, test_state, StubFetcher,
    CHART_URL, NEWS_URL, PRICE_URL,
};

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn stocked_fetcher() -> Arc<StubFetcher> {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(PRICE_URL, price_table_html("2025/06/16", "156,868", "1,788", "49,186"));
    fetcher.respond(NEWS_URL, news_page_html());
    fetcher.respond(CHART_URL, b"GIF89a\x01\x00\x01\x00".to_vec());
    fetcher
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = build_router(test_state(memory_storage(), stocked_fetcher()));

    let (status, json) = send(&app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "memory");
}

#[tokio::test]
async fn test_empty_store_reads() {
    let app = build_router(test_state(memory_storage(), stocked_fetcher()));

    let (status, json) = send(&app, Method::GET, "/api/silver-prices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::Array(vec![]));

    let (status, json) = send(&app, Method::GET, "/api/silver-prices/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);

    let (status, _) = send(&app, Method::GET, "/api/silver-chart").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_price_scrape_then_read() {
    let app = build_router(test_state(sqlite_storage().await, stocked_fetcher()));

    let (status, json) = send(&app, Method::POST, "/api/silver-prices/scrape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, json) = send(&app, Method::GET, "/api/silver-prices/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["date"], "2025/06/16");
    assert_eq!(json["priceKrw"], 156_868);
    assert_eq!(json["priceUsd"], 1_788);
    assert_eq!(json["priceOunce"], 49_186);
    assert!(json.get("createdAt").is_some());
}

#[tokio::test]
async fn test_failed_manual_scrape_returns_500() {
    let fetcher = stocked_fetcher();
    fetcher.fail(PRICE_URL, 502);
    let app = build_router(test_state(memory_storage(), fetcher));

    let (status, json) = send(&app, Method::POST, "/api/silver-prices/scrape").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);

    let (_, jobs) = send(&app, Method::GET, "/api/jobs").await;
    let price_job = jobs
        .as_array()
        .unwrap()
        .iter()
        .find(|j| j["jobName"] == "silver_price_scraper")
        .unwrap();
    assert_eq!(price_job["errorCount"], 1);
    assert!(price_job["lastError"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn test_news_scrape_limit_and_clear() {
    let app = build_router(test_state(memory_storage(), stocked_fetcher()));

    let (status, _) = send(&app, Method::POST, "/api/news/scrape").await;
    assert_eq!(status, StatusCode::OK);

    // Display limit is 2 in the test state
    let (_, json) = send(&app, Method::GET, "/api/news").await;
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Silver slips", "Silver climbs"]);

    let (_, json) = send(&app, Method::GET, "/api/news/all").await;
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[0]["url"], "http://news.test/b");

    let (status, json) = send(&app, Method::DELETE, "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], 3);

    let (_, json) = send(&app, Method::GET, "/api/news/all").await;
    assert_eq!(json, Value::Array(vec![]));
}

#[tokio::test]
async fn test_chart_scrape_then_read() {
    let app = build_router(test_state(memory_storage(), stocked_fetcher()));

    let (status, _) = send(&app, Method::POST, "/api/silver-chart/scrape").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, Method::GET, "/api/silver-chart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["imageUrl"], CHART_URL);
    assert!(json["imageData"].as_str().unwrap().starts_with("R0lGODlh"));
}

#[tokio::test]
async fn test_job_listing_includes_every_job() {
    let app = build_router(test_state(memory_storage(), stocked_fetcher()));

    let (status, json) = send(&app, Method::GET, "/api/jobs").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["jobName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["chart_scraper", "news_scraper", "silver_price_scraper"]);
}
