//! News Scrape Job
//!
//! Walks every configured news source, extracts its stories and appends
//! them to storage. Sources are independent: one failing source is logged
//! and the rest still run.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{RunGuard, ScrapeJob};
use crate::error::ScrapeError;
use crate::scrapers::news::extract_news;
use crate::scrapers::parser::snippet;
use crate::scrapers::{Fetcher, NewsSourceConfig};
use crate::services::job_status::JobStatusRegistry;
use crate::storage::SharedStorage;

const LOG_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsScrapeSummary {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub inserted: usize,
    pub skipped_duplicates: usize,
}

#[derive(Debug, Default)]
struct SourceResult {
    inserted: usize,
    skipped_duplicates: usize,
}

pub struct NewsScraper {
    storage: SharedStorage,
    fetcher: Arc<dyn Fetcher>,
    sources: Vec<NewsSourceConfig>,
    max_items: usize,
    dedup_by_url: bool,
    status: JobStatusRegistry,
    running: AtomicBool,
}

impl NewsScraper {
    pub const NAME: &'static str = "news_scraper";

    pub fn new(
        storage: SharedStorage,
        fetcher: Arc<dyn Fetcher>,
        sources: Vec<NewsSourceConfig>,
        status: JobStatusRegistry,
    ) -> Self {
        status.register(Self::NAME);

        Self {
            storage,
            fetcher,
            sources,
            max_items: 10,
            dedup_by_url: true,
            status,
            running: AtomicBool::new(false),
        }
    }

    /// Cap on stories taken from a single source per run
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// When off, every scrape is purely additive
    pub fn with_dedup_by_url(mut self, dedup_by_url: bool) -> Self {
        self.dedup_by_url = dedup_by_url;
        self
    }

    pub async fn scrape(&self) -> Result<NewsScrapeSummary, ScrapeError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            self.status.record_skipped(Self::NAME);
            return Err(ScrapeError::AlreadyRunning(Self::NAME));
        };

        let result = self.scrape_all_sources().await;
        match &result {
            Ok(_) => self.status.record_success(Self::NAME),
            Err(e) => self.status.record_failure(Self::NAME, &e.to_string()),
        }
        result
    }

    async fn scrape_all_sources(&self) -> Result<NewsScrapeSummary, ScrapeError> {
        let mut summary = NewsScrapeSummary::default();

        if self.sources.is_empty() {
            warn!(job = Self::NAME, "No news sources configured");
            return Ok(summary);
        }

        for source in &self.sources {
            match self.scrape_source(source).await {
                Ok(result) => {
                    info!(
                        job = Self::NAME,
                        source = %source.name,
                        inserted = result.inserted,
                        skipped_duplicates = result.skipped_duplicates,
                        "News source scraped"
                    );
                    summary.sources_ok += 1;
                    summary.inserted += result.inserted;
                    summary.skipped_duplicates += result.skipped_duplicates;
                }
                Err(e) => {
                    error!(
                        job = Self::NAME,
                        source = %source.name,
                        url = %source.url,
                        stage = e.stage(),
                        error = %e,
                        "News source failed"
                    );
                    summary.sources_failed += 1;
                }
            }
        }

        if summary.sources_ok == 0 {
            return Err(ScrapeError::AllSourcesFailed(summary.sources_failed));
        }

        Ok(summary)
    }

    async fn scrape_source(&self, source: &NewsSourceConfig) -> Result<SourceResult, ScrapeError> {
        debug!(job = Self::NAME, source = %source.name, url = %source.url, "Fetching news page");
        let html = self.fetcher.fetch_text(&source.url).await?;

        let items = extract_news(&html, source, Utc::now().naive_utc())?;
        if items.is_empty() {
            warn!(
                job = Self::NAME,
                source = %source.name,
                snippet = %snippet(&html, LOG_SNIPPET_CHARS),
                "No news items matched the configured selectors"
            );
        }

        let mut result = SourceResult::default();
        for item in items.into_iter().take(self.max_items) {
            if self.dedup_by_url && self.storage.news_item_exists(&item.url).await? {
                result.skipped_duplicates += 1;
                continue;
            }

            self.storage.insert_news_item(item).await?;
            result.inserted += 1;
        }

        Ok(result)
    }
}

#[async_trait]
impl ScrapeJob for NewsScraper {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) {
        info!(job = Self::NAME, sources = self.sources.len(), "Starting news scraping");

        match self.scrape().await {
            Ok(summary) => {
                info!(
                    job = Self::NAME,
                    inserted = summary.inserted,
                    skipped_duplicates = summary.skipped_duplicates,
                    sources_failed = summary.sources_failed,
                    "News scraping complete"
                );
            }
            Err(ScrapeError::AlreadyRunning(_)) => {
                warn!(job = Self::NAME, "Previous news run still in flight, skipping");
            }
            Err(e) => {
                error!(job = Self::NAME, stage = e.stage(), error = %e, "News scraping failed");
            }
        }
    }
}
