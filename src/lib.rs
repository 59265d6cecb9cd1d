// src/lib.rs

use std::sync::Arc;

use error::ExtractionError;
use jobs::{chart_scraper::ChartScraper, news_scraper::NewsScraper, silver_price_scraper::SilverPriceScraper};
use scrapers::{Fetcher, ScraperConfig};
use services::job_status::JobStatusRegistry;
use storage::SharedStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: SharedStorage,
    pub silver_price_scraper: Arc<SilverPriceScraper>,
    pub news_scraper: Arc<NewsScraper>,
    pub chart_scraper: Arc<ChartScraper>,
    pub job_status: JobStatusRegistry,
    /// Items returned by GET /api/news
    pub news_display_limit: u64,
}

impl AppState {
    /// Wire the three scrape jobs to one storage and one fetcher.
    pub fn new(
        storage: SharedStorage,
        fetcher: Arc<dyn Fetcher>,
        config: &ScraperConfig,
        news_display_limit: u64,
    ) -> Result<Self, ExtractionError> {
        let job_status = JobStatusRegistry::new();

        let silver_price_scraper = SilverPriceScraper::new(
            storage.clone(),
            fetcher.clone(),
            config.price_url.clone(),
            job_status.clone(),
        )?;

        let news_scraper = NewsScraper::new(
            storage.clone(),
            fetcher.clone(),
            config.news_sources.clone(),
            job_status.clone(),
        )
        .with_max_items(config.news_max_items)
        .with_dedup_by_url(config.news_dedup_by_url);

        let chart_scraper = ChartScraper::new(
            storage.clone(),
            fetcher,
            config.chart_url.clone(),
            job_status.clone(),
        );

        Ok(Self {
            storage,
            silver_price_scraper: Arc::new(silver_price_scraper),
            news_scraper: Arc::new(news_scraper),
            chart_scraper: Arc::new(chart_scraper),
            job_status,
            news_display_limit,
        })
    }
}

pub mod entities {
    pub mod prelude;
    pub mod news;
    pub mod silver_charts;
    pub mod silver_prices;
}

pub mod services {
    pub mod job_status;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod router;
pub mod scrapers;
pub mod storage;
