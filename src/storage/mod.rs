//! Persistence layer shared by the scrape jobs and the read endpoints.
//!
//! The backend is resolved once at startup from configuration; everything
//! else only sees `Arc<dyn Storage>`.

pub mod database;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageBackend;
use crate::error::StorageError;
use crate::models::chart::{ChartSnapshot, NewChartSnapshot};
use crate::models::news::{NewNewsItem, NewsItem};
use crate::models::silver_price::{NewPriceObservation, PriceObservation};

pub use database::DatabaseStorage;
pub use memory::MemStorage;

pub type SharedStorage = Arc<dyn Storage>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// "database" or "memory"
    fn backend_name(&self) -> &'static str;

    /// Insert a new observation or overwrite the one sharing its date.
    ///
    /// Overwrites keep `id` and `created_at` and refresh `updated_at`.
    async fn upsert_price_observation(
        &self,
        record: NewPriceObservation,
    ) -> Result<PriceObservation, StorageError>;

    /// All observations, newest date first.
    async fn list_price_observations(&self) -> Result<Vec<PriceObservation>, StorageError>;

    async fn get_latest_price_observation(&self) -> Result<Option<PriceObservation>, StorageError>;

    /// Append-only, no key.
    async fn insert_news_item(&self, record: NewNewsItem) -> Result<NewsItem, StorageError>;

    async fn news_item_exists(&self, url: &str) -> Result<bool, StorageError>;

    /// Newest `published_at` first, capped to `limit` when given.
    async fn list_news_items(&self, limit: Option<u64>) -> Result<Vec<NewsItem>, StorageError>;

    /// Returns the number of deleted items.
    async fn clear_news_items(&self) -> Result<u64, StorageError>;

    /// Replace whatever snapshot is stored with `record`.
    async fn replace_chart_snapshot(
        &self,
        record: NewChartSnapshot,
    ) -> Result<ChartSnapshot, StorageError>;

    async fn get_chart_snapshot(&self) -> Result<Option<ChartSnapshot>, StorageError>;
}

/// Build the configured backend. The database backend runs migrations first.
pub async fn connect(backend: &StorageBackend) -> Result<SharedStorage, StorageError> {
    match backend {
        StorageBackend::Database { url } => {
            let storage = DatabaseStorage::connect(url).await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory { seed_sample_data } => {
            let storage = MemStorage::new();
            if *seed_sample_data {
                storage.seed_sample_data();
            }
            tracing::warn!("Using in-memory storage; scraped data is lost on restart");
            Ok(Arc::new(storage))
        }
    }
}
