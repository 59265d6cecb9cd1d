use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::Storage;
use crate::error::StorageError;
use crate::models::chart::{ChartSnapshot, NewChartSnapshot};
use crate::models::news::{NewNewsItem, NewsItem, DEFAULT_NEWS_CATEGORY};
use crate::models::silver_price::{NewPriceObservation, PriceObservation};

#[derive(Default)]
struct MemState {
    /// Keyed by date; BTreeMap order is the date order
    prices: BTreeMap<String, PriceObservation>,
    news: Vec<NewsItem>,
    chart: Option<ChartSnapshot>,
    next_price_id: i32,
    next_news_id: i32,
    next_chart_id: i32,
}

impl MemState {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

/// Process-local storage used when no database is configured.
///
/// Every operation takes the lock once, so readers see either the old or
/// the new version of a record.
#[derive(Default)]
pub struct MemStorage {
    state: RwLock<MemState>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// One price for today and one news item, so a fresh deployment has
    /// something to render before the first scrape lands.
    pub fn seed_sample_data(&self) {
        let now = Utc::now().naive_utc();
        let today = now.format("%Y/%m/%d").to_string();
        let mut state = self.state.write();

        let id = MemState::next_id(&mut state.next_price_id);
        state.prices.insert(
            today.clone(),
            PriceObservation {
                id,
                date: today,
                price_krw: 156_868,
                price_usd: 1_788,
                price_ounce: 49_186,
                created_at: now,
                updated_at: now,
            },
        );

        let id = MemState::next_id(&mut state.next_news_id);
        state.news.push(NewsItem {
            id,
            title: "Silver price trend analysis".to_string(),
            description: Some("Recent silver market movements and outlook".to_string()),
            url: "#".to_string(),
            source: "sample".to_string(),
            published_at: now,
            category: DEFAULT_NEWS_CATEGORY.to_string(),
            created_at: now,
        });
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert_price_observation(
        &self,
        record: NewPriceObservation,
    ) -> Result<PriceObservation, StorageError> {
        let now = Utc::now().naive_utc();
        let mut state = self.state.write();

        if let Some(existing) = state.prices.get_mut(&record.date) {
            existing.price_krw = record.price_krw;
            existing.price_usd = record.price_usd;
            existing.price_ounce = record.price_ounce;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let id = MemState::next_id(&mut state.next_price_id);
        let observation = PriceObservation {
            id,
            date: record.date.clone(),
            price_krw: record.price_krw,
            price_usd: record.price_usd,
            price_ounce: record.price_ounce,
            created_at: now,
            updated_at: now,
        };
        state.prices.insert(record.date, observation.clone());

        Ok(observation)
    }

    async fn list_price_observations(&self) -> Result<Vec<PriceObservation>, StorageError> {
        Ok(self.state.read().prices.values().rev().cloned().collect())
    }

    async fn get_latest_price_observation(&self) -> Result<Option<PriceObservation>, StorageError> {
        Ok(self.state.read().prices.values().next_back().cloned())
    }

    async fn insert_news_item(&self, record: NewNewsItem) -> Result<NewsItem, StorageError> {
        let mut state = self.state.write();
        let id = MemState::next_id(&mut state.next_news_id);

        let item = NewsItem {
            id,
            title: record.title,
            description: record.description,
            url: record.url,
            source: record.source,
            published_at: record.published_at,
            category: record.category,
            created_at: Utc::now().naive_utc(),
        };
        state.news.push(item.clone());

        Ok(item)
    }

    async fn news_item_exists(&self, url: &str) -> Result<bool, StorageError> {
        Ok(self.state.read().news.iter().any(|n| n.url == url))
    }

    async fn list_news_items(&self, limit: Option<u64>) -> Result<Vec<NewsItem>, StorageError> {
        let mut items = self.state.read().news.clone();
        items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        if let Some(limit) = limit {
            items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(items)
    }

    async fn clear_news_items(&self) -> Result<u64, StorageError> {
        let mut state = self.state.write();
        let deleted = state.news.len() as u64;
        state.news.clear();
        Ok(deleted)
    }

    async fn replace_chart_snapshot(
        &self,
        record: NewChartSnapshot,
    ) -> Result<ChartSnapshot, StorageError> {
        let mut state = self.state.write();
        let id = MemState::next_id(&mut state.next_chart_id);

        let chart = ChartSnapshot {
            id,
            image_url: record.image_url,
            image_data: record.image_data,
            last_updated: record.last_updated,
            created_at: Utc::now().naive_utc(),
        };
        state.chart = Some(chart.clone());

        Ok(chart)
    }

    async fn get_chart_snapshot(&self) -> Result<Option<ChartSnapshot>, StorageError> {
        Ok(self.state.read().chart.clone())
    }
}
