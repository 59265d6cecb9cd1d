mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sea_orm::{EntityTrait, PaginatorTrait};
use silver_price_backend::entities::prelude::SilverCharts;
use silver_price_backend::jobs::chart_scraper::ChartScraper;
use silver_price_backend::models::chart::NewChartSnapshot;
use silver_price_backend::models::news::NewNewsItem;
use silver_price_backend::models::silver_price::NewPriceObservation;
use silver_price_backend::services::job_status::JobStatusRegistry;
use silver_price_backend::storage::{SharedStorage, Storage};

use crate::common::{memory_storage, sqlite_database, sqlite_storage, StubFetcher, CHART_URL};

fn observation(date: &str, krw: i64) -> NewPriceObservation {
    NewPriceObservation {
        date: date.to_string(),
        price_krw: krw,
        price_usd: 1_788,
        price_ounce: 49_186,
    }
}

fn chart(n: u32) -> NewChartSnapshot {
    NewChartSnapshot {
        image_url: CHART_URL.to_string(),
        image_data: format!("R0lGODlh-{}", n),
        last_updated: NaiveDate::from_ymd_opt(2025, 6, 16)
            .unwrap()
            .and_hms_opt(10, n, 0)
            .unwrap(),
    }
}

fn news_item(title: &str, url: &str, day: u32) -> NewNewsItem {
    NewNewsItem {
        title: title.to_string(),
        description: None,
        url: url.to_string(),
        source: "Test Wire".to_string(),
        published_at: NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        category: "precious-metals".to_string(),
    }
}

async fn backends() -> Vec<SharedStorage> {
    vec![memory_storage(), sqlite_storage().await]
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    for storage in backends().await {
        let first = storage
            .upsert_price_observation(observation("2025/06/16", 156_868))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = storage
            .upsert_price_observation(observation("2025/06/16", 156_868))
            .await
            .unwrap();

        assert_eq!(storage.list_price_observations().await.unwrap().len(), 1, "{}", storage.backend_name());
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at, "{}", storage.backend_name());
    }
}

#[tokio::test]
async fn test_long_date_text_is_stored_verbatim() {
    let date = "2025/06/16 (Mon) 10:40 KST, second update";

    for storage in backends().await {
        storage
            .upsert_price_observation(observation(date, 156_868))
            .await
            .unwrap();
        storage
            .upsert_price_observation(observation(date, 160_000))
            .await
            .unwrap();

        let prices = storage.list_price_observations().await.unwrap();
        assert_eq!(prices.len(), 1, "{}", storage.backend_name());
        assert_eq!(prices[0].date, date);
        assert_eq!(prices[0].price_krw, 160_000);
    }
}

#[tokio::test]
async fn test_latest_is_max_date_regardless_of_insert_order() {
    for storage in backends().await {
        for date in ["2025/06/13", "2025/06/17", "2025/06/16"] {
            storage
                .upsert_price_observation(observation(date, 150_000))
                .await
                .unwrap();
        }

        let latest = storage.get_latest_price_observation().await.unwrap().unwrap();
        assert_eq!(latest.date, "2025/06/17", "{}", storage.backend_name());

        let dates: Vec<String> = storage
            .list_price_observations()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec!["2025/06/17", "2025/06/16", "2025/06/13"]);
    }
}

#[tokio::test]
async fn test_chart_snapshot_is_a_singleton() {
    for storage in backends().await {
        assert!(storage.get_chart_snapshot().await.unwrap().is_none());

        for n in 1..=3 {
            storage.replace_chart_snapshot(chart(n)).await.unwrap();
        }

        let chart = storage.get_chart_snapshot().await.unwrap().unwrap();
        assert_eq!(chart.image_data, "R0lGODlh-3", "{}", storage.backend_name());
    }
}

#[tokio::test]
async fn test_chart_replace_leaves_one_row() {
    let storage = sqlite_database().await;

    for n in 1..=3 {
        storage.replace_chart_snapshot(chart(n)).await.unwrap();
    }

    let rows = SilverCharts::find().count(storage.connection()).await.unwrap();
    assert_eq!(rows, 1);
    let stored = storage.get_chart_snapshot().await.unwrap().unwrap();
    assert_eq!(stored.image_data, "R0lGODlh-3");
}

#[tokio::test]
async fn test_repeated_chart_scrapes_leave_one_row() {
    let storage = sqlite_database().await;
    let fetcher = Arc::new(StubFetcher::new());
    let job = ChartScraper::new(storage.clone(), fetcher.clone(), CHART_URL, JobStatusRegistry::new());

    for frame in [b"GIF89a-1", b"GIF89a-2", b"GIF89a-3"] {
        fetcher.respond(CHART_URL, frame.to_vec());
        job.scrape().await.unwrap();
    }

    let rows = SilverCharts::find().count(storage.connection()).await.unwrap();
    assert_eq!(rows, 1);
    let stored = storage.get_chart_snapshot().await.unwrap().unwrap();
    assert_eq!(stored.image_data, "R0lGODlhLTM=");
}

#[tokio::test]
async fn test_news_listing_limit_and_clear() {
    for storage in backends().await {
        storage.insert_news_item(news_item("Older", "http://n.test/1", 14)).await.unwrap();
        storage.insert_news_item(news_item("Newest", "http://n.test/2", 16)).await.unwrap();
        storage.insert_news_item(news_item("Middle", "http://n.test/3", 15)).await.unwrap();

        assert!(storage.news_item_exists("http://n.test/2").await.unwrap());
        assert!(!storage.news_item_exists("http://n.test/9").await.unwrap());

        let top: Vec<String> = storage
            .list_news_items(Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(top, vec!["Newest", "Middle"], "{}", storage.backend_name());

        assert_eq!(storage.clear_news_items().await.unwrap(), 3);
        assert!(storage.list_news_items(None).await.unwrap().is_empty());
    }
}
