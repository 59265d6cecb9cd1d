pub mod chart;
pub mod news;
pub mod parser;
pub mod price_table;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::models::news::DEFAULT_NEWS_CATEGORY;

pub const DEFAULT_PRICE_URL: &str = "http://www.ycmetal.co.kr/price/price02.php";
pub const DEFAULT_CHART_URL: &str = "https://www.kitco.com/chart-images/images/live/silver.gif";
pub const DEFAULT_USER_AGENT: &str = concat!("silver-price-backend/", env!("CARGO_PKG_VERSION"));

/// Retrieves upstream resources. One attempt per call; the next scheduled
/// tick is the retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(bytes.to_vec())
    }
}

/// Describes one HTML news listing page and where its fields live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSourceConfig {
    /// Publisher name stored on every item
    pub name: String,
    pub url: String,
    /// Matches one element per story
    pub item_selector: String,
    pub title_selector: String,
    /// Defaults to the item itself when it is a link, else its first `a[href]`
    #[serde(default)]
    pub link_selector: Option<String>,
    #[serde(default)]
    pub description_selector: Option<String>,
    #[serde(default)]
    pub time_selector: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_NEWS_CATEGORY.to_string()
}

impl NewsSourceConfig {
    pub fn kitco_silver() -> Self {
        Self {
            name: "Kitco".to_string(),
            url: "https://www.kitco.com/news/category/commodities/silver".to_string(),
            item_selector: "article".to_string(),
            title_selector: "h3, h2".to_string(),
            link_selector: Some("a[href]".to_string()),
            description_selector: Some("p".to_string()),
            time_selector: Some("time".to_string()),
            category: default_category(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub price_url: String,
    pub chart_url: String,
    pub news_sources: Vec<NewsSourceConfig>,
    pub news_max_items: usize,
    /// Skip news items whose URL is already stored
    pub news_dedup_by_url: bool,
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            price_url: DEFAULT_PRICE_URL.to_string(),
            chart_url: DEFAULT_CHART_URL.to_string(),
            news_sources: vec![NewsSourceConfig::kitco_silver()],
            news_max_items: 10,
            news_dedup_by_url: true,
            http_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
