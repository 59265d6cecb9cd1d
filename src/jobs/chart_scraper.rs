//! Chart Scrape Job
//!
//! Downloads the live silver chart image and replaces the stored snapshot.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{RunGuard, ScrapeJob};
use crate::error::ScrapeError;
use crate::models::chart::{ChartSnapshot, NewChartSnapshot};
use crate::scrapers::chart::encode_chart_image;
use crate::scrapers::Fetcher;
use crate::services::job_status::JobStatusRegistry;
use crate::storage::SharedStorage;

pub struct ChartScraper {
    storage: SharedStorage,
    fetcher: Arc<dyn Fetcher>,
    url: String,
    status: JobStatusRegistry,
    running: AtomicBool,
}

impl ChartScraper {
    pub const NAME: &'static str = "chart_scraper";

    pub fn new(
        storage: SharedStorage,
        fetcher: Arc<dyn Fetcher>,
        url: impl Into<String>,
        status: JobStatusRegistry,
    ) -> Self {
        status.register(Self::NAME);

        Self {
            storage,
            fetcher,
            url: url.into(),
            status,
            running: AtomicBool::new(false),
        }
    }

    pub async fn scrape(&self) -> Result<ChartSnapshot, ScrapeError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            self.status.record_skipped(Self::NAME);
            return Err(ScrapeError::AlreadyRunning(Self::NAME));
        };

        let result = self.scrape_once().await;
        match &result {
            Ok(_) => self.status.record_success(Self::NAME),
            Err(e) => self.status.record_failure(Self::NAME, &e.to_string()),
        }
        result
    }

    async fn scrape_once(&self) -> Result<ChartSnapshot, ScrapeError> {
        debug!(job = Self::NAME, url = %self.url, "Fetching chart image");
        let bytes = self.fetcher.fetch_bytes(&self.url).await?;

        let image_data = encode_chart_image(&self.url, &bytes)?;

        let snapshot = self
            .storage
            .replace_chart_snapshot(NewChartSnapshot {
                image_url: self.url.clone(),
                image_data,
                last_updated: Utc::now().naive_utc(),
            })
            .await?;

        Ok(snapshot)
    }
}

#[async_trait]
impl ScrapeJob for ChartScraper {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) {
        info!(job = Self::NAME, "Starting chart scraping");

        match self.scrape().await {
            Ok(chart) => {
                info!(
                    job = Self::NAME,
                    encoded_len = chart.image_data.len(),
                    last_updated = %chart.last_updated,
                    "Silver chart updated"
                );
            }
            Err(ScrapeError::AlreadyRunning(_)) => {
                warn!(job = Self::NAME, "Previous chart run still in flight, skipping");
            }
            Err(e) => {
                error!(
                    job = Self::NAME,
                    stage = e.stage(),
                    url = %self.url,
                    error = %e,
                    "Chart scraping failed"
                );
            }
        }
    }
}
