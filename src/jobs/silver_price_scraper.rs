//! Silver Price Scrape Job
//!
//! Fetches the published price table, extracts the most recent row,
//! normalises its three prices and upserts the observation keyed by date.
//! Failures at any stage are logged with the stage and source URL; the next
//! scheduled tick is the retry.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{RunGuard, ScrapeJob};
use crate::error::{ExtractionError, ScrapeError};
use crate::models::silver_price::PriceObservation;
use crate::scrapers::parser::snippet;
use crate::scrapers::price_table::{normalize_price_row, PriceExtractor, TablePositionExtractor};
use crate::scrapers::Fetcher;
use crate::services::job_status::JobStatusRegistry;
use crate::storage::SharedStorage;

/// Characters of raw HTML logged alongside extraction failures
const LOG_SNIPPET_CHARS: usize = 200;

pub struct SilverPriceScraper {
    storage: SharedStorage,
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn PriceExtractor>,
    url: String,
    status: JobStatusRegistry,
    running: AtomicBool,
}

impl SilverPriceScraper {
    pub const NAME: &'static str = "silver_price_scraper";

    pub fn new(
        storage: SharedStorage,
        fetcher: Arc<dyn Fetcher>,
        url: impl Into<String>,
        status: JobStatusRegistry,
    ) -> Result<Self, ExtractionError> {
        status.register(Self::NAME);

        Ok(Self {
            storage,
            fetcher,
            extractor: Box::new(TablePositionExtractor::new()?),
            url: url.into(),
            status,
            running: AtomicBool::new(false),
        })
    }

    /// Swap the parsing contract without touching the orchestration.
    pub fn with_extractor(mut self, extractor: Box<dyn PriceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One complete run. Errors are returned to the caller (manual triggers)
    /// and recorded in the job status registry.
    pub async fn scrape(&self) -> Result<PriceObservation, ScrapeError> {
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

    async fn scrape_once(&self) -> Result<PriceObservation, ScrapeError> {
        debug!(job = Self::NAME, url = %self.url, "Fetching price page");
        let html = self.fetcher.fetch_text(&self.url).await?;

        debug!(
            job = Self::NAME,
            bytes = html.len(),
            extractor = self.extractor.version(),
            "Extracting price row"
        );
        let row = self.extractor.extract(&html).inspect_err(|e| {
            warn!(
                job = Self::NAME,
                url = %self.url,
                extractor = self.extractor.version(),
                error = %e,
                snippet = %snippet(&html, LOG_SNIPPET_CHARS),
                "Price table did not match the expected layout"
            );
        })?;

        let observation = normalize_price_row(&row).inspect_err(|e| {
            warn!(
                job = Self::NAME,
                url = %self.url,
                error = %e,
                row = ?row,
                "Price row did not normalise"
            );
        })?;

        let stored = self.storage.upsert_price_observation(observation).await?;

        Ok(stored)
    }
}

#[async_trait]
impl ScrapeJob for SilverPriceScraper {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) {
        info!(job = Self::NAME, "Starting silver price scraping");

        match self.scrape().await {
            Ok(price) => {
                info!(
                    job = Self::NAME,
                    date = %price.date,
                    price_krw = price.price_krw,
                    price_usd = price.price_usd,
                    price_ounce = price.price_ounce,
                    "Silver price updated"
                );
            }
            Err(ScrapeError::AlreadyRunning(_)) => {
                warn!(job = Self::NAME, "Previous silver price run still in flight, skipping");
            }
            Err(e) => {
                error!(
                    job = Self::NAME,
                    stage = e.stage(),
                    url = %self.url,
                    error = %e,
                    "Silver price scraping failed"
                );
            }
        }
    }
}
