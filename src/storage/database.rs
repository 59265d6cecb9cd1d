use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use super::Storage;
use crate::entities::{news, prelude::*, silver_charts, silver_prices};
use crate::error::StorageError;
use crate::models::chart::{ChartSnapshot, NewChartSnapshot};
use crate::models::news::{NewNewsItem, NewsItem};
use crate::models::silver_price::{NewPriceObservation, PriceObservation};

/// SeaORM-backed storage (Postgres in production, SQLite in tests).
#[derive(Clone)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        // Every pooled connection to `sqlite::memory:` would be its own database
        if database_url.starts_with("sqlite") && database_url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }

        tracing::info!("Connecting to database...");
        let db = Database::connect(options).await?;

        tracing::info!("Running migrations...");
        migration::Migrator::up(&db, None).await?;

        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl From<silver_prices::Model> for PriceObservation {
    fn from(m: silver_prices::Model) -> Self {
        Self {
            id: m.id,
            date: m.date,
            price_krw: m.price_krw,
            price_usd: m.price_usd,
            price_ounce: m.price_ounce,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<news::Model> for NewsItem {
    fn from(m: news::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            url: m.url,
            source: m.source,
            published_at: m.published_at,
            category: m.category,
            created_at: m.created_at,
        }
    }
}

impl From<silver_charts::Model> for ChartSnapshot {
    fn from(m: silver_charts::Model) -> Self {
        Self {
            id: m.id,
            image_url: m.image_url,
            image_data: m.image_data,
            last_updated: m.last_updated,
            created_at: m.created_at,
        }
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    fn backend_name(&self) -> &'static str {
        "database"
    }

    async fn upsert_price_observation(
        &self,
        record: NewPriceObservation,
    ) -> Result<PriceObservation, StorageError> {
        let now = Utc::now().naive_utc();

        let row = silver_prices::ActiveModel {
            date: Set(record.date.clone()),
            price_krw: Set(record.price_krw),
            price_usd: Set(record.price_usd),
            price_ounce: Set(record.price_ounce),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        // Single INSERT .. ON CONFLICT statement: a date collision becomes an
        // update of the price columns, id and created_at stay as they were.
        SilverPrices::insert(row)
            .on_conflict(
                OnConflict::column(silver_prices::Column::Date)
                    .update_columns([
                        silver_prices::Column::PriceKrw,
                        silver_prices::Column::PriceUsd,
                        silver_prices::Column::PriceOunce,
                        silver_prices::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let stored = SilverPrices::find()
            .filter(silver_prices::Column::Date.eq(&record.date))
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("silver price for {}", record.date)))?;

        Ok(stored.into())
    }

    async fn list_price_observations(&self) -> Result<Vec<PriceObservation>, StorageError> {
        let rows = SilverPrices::find()
            .order_by(silver_prices::Column::Date, Order::Desc)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_latest_price_observation(&self) -> Result<Option<PriceObservation>, StorageError> {
        let latest = SilverPrices::find()
            .order_by(silver_prices::Column::Date, Order::Desc)
            .limit(1)
            .one(&self.db)
            .await?;

        Ok(latest.map(Into::into))
    }

    async fn insert_news_item(&self, record: NewNewsItem) -> Result<NewsItem, StorageError> {
        let row = news::ActiveModel {
            title: Set(record.title),
            description: Set(record.description),
            url: Set(record.url),
            source: Set(record.source),
            published_at: Set(record.published_at),
            category: Set(record.category),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        let inserted = row.insert(&self.db).await?;
        Ok(inserted.into())
    }

    async fn news_item_exists(&self, url: &str) -> Result<bool, StorageError> {
        let count = News::find()
            .filter(news::Column::Url.eq(url))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn list_news_items(&self, limit: Option<u64>) -> Result<Vec<NewsItem>, StorageError> {
        let mut query = News::find()
            .order_by(news::Column::PublishedAt, Order::Desc)
            .order_by(news::Column::Id, Order::Desc);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let rows = query.all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn clear_news_items(&self) -> Result<u64, StorageError> {
        let result = News::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn replace_chart_snapshot(
        &self,
        record: NewChartSnapshot,
    ) -> Result<ChartSnapshot, StorageError> {
        // Delete and insert commit together, readers never see an empty table
        let txn = self.db.begin().await?;

        SilverCharts::delete_many().exec(&txn).await?;

        let inserted = silver_charts::ActiveModel {
            image_url: Set(record.image_url),
            image_data: Set(record.image_data),
            last_updated: Set(record.last_updated),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(inserted.into())
    }

    async fn get_chart_snapshot(&self) -> Result<Option<ChartSnapshot>, StorageError> {
        let chart = SilverCharts::find()
            .order_by(silver_charts::Column::LastUpdated, Order::Desc)
            .one(&self.db)
            .await?;

        Ok(chart.map(Into::into))
    }
}
