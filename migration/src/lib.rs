pub use sea_orm_migration::prelude::*;

mod m20250616_000001_create_silver_prices;
mod m20250616_000002_create_news;
mod m20250616_000003_create_silver_charts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250616_000001_create_silver_prices::Migration),
            Box::new(m20250616_000002_create_news::Migration),
            Box::new(m20250616_000003_create_silver_charts::Migration),
        ]
    }
}
