#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use silver_price_backend::error::FetchError;
use silver_price_backend::scrapers::{Fetcher, NewsSourceConfig, ScraperConfig};
use silver_price_backend::storage::{DatabaseStorage, MemStorage, SharedStorage};
use silver_price_backend::AppState;

pub const PRICE_URL: &str = "http://prices.test/price/price02.php";
pub const CHART_URL: &str = "http://charts.test/silver.gif";
pub const NEWS_URL: &str = "http://news.test/silver";

/// Serves canned bodies per URL; unknown URLs answer 404.
/// Responses can be swapped between scrapes to simulate upstream changes.
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, Result<Vec<u8>, u16>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.responses.lock().insert(url.to_string(), Ok(body.into()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses.lock().insert(url.to_string(), Err(status));
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.responses.lock().get(url).cloned().unwrap_or(Err(404));
        response.map_err(|code| FetchError::Status {
            url: url.to_string(),
            status: StatusCode::from_u16(code).unwrap(),
        })
    }
}

/// A page shaped like the published price table: header row, then the
/// latest row (date, krw, usd, ounce, change column).
pub fn price_table_html(date: &str, krw: &str, usd: &str, ounce: &str) -> String {
    format!(
        r#"<html><body>
        <table class="tb-style3">
          <tr><th>Date</th><th>KRW</th><th>USD</th><th>Ounce</th><th>Change</th></tr>
          <tr><td>{date}</td><td>{krw}</td><td>{usd}</td><td>{ounce}</td><td>+120</td></tr>
          <tr><td>2025/06/13</td><td>150,000</td><td>1,700</td><td>48,000</td><td>-50</td></tr>
        </table></body></html>"#
    )
}

pub fn header_only_table_html() -> String {
    r#"<table class="tb-style3"><tr><th>Date</th><th>KRW</th><th>USD</th><th>Ounce</th></tr></table>"#
        .to_string()
}

pub fn news_page_html() -> String {
    r#"<div class="list">
        <div class="story"><h3>Silver climbs</h3><a href="/a">more</a><time>2025-06-16 09:00</time></div>
        <div class="story"><h3>Silver slips</h3><a href="/b">more</a><time>2025-06-16 12:00</time></div>
        <div class="story"><h3>Mints sell out</h3><a href="/c">more</a><time>2025-06-15 08:00</time></div>
    </div>"#
        .to_string()
}

pub fn test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        price_url: PRICE_URL.to_string(),
        chart_url: CHART_URL.to_string(),
        news_sources: vec![NewsSourceConfig {
            name: "Test Wire".to_string(),
            url: NEWS_URL.to_string(),
            item_selector: "div.story".to_string(),
            title_selector: "h3".to_string(),
            link_selector: None,
            description_selector: None,
            time_selector: Some("time".to_string()),
            category: "precious-metals".to_string(),
        }],
        ..ScraperConfig::default()
    }
}

pub fn memory_storage() -> SharedStorage {
    Arc::new(MemStorage::new())
}

/// Fresh, migrated in-memory SQLite database
pub async fn sqlite_database() -> Arc<DatabaseStorage> {
    Arc::new(
        DatabaseStorage::connect("sqlite::memory:")
            .await
            .expect("Failed to set up sqlite test database"),
    )
}

pub async fn sqlite_storage() -> SharedStorage {
    sqlite_database().await
}

pub fn test_state(storage: SharedStorage, fetcher: Arc<StubFetcher>) -> AppState {
    AppState::new(storage, fetcher, &test_scraper_config(), 2).expect("Failed to build state")
}
