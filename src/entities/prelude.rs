//! `SeaORM` Entity prelude

pub use super::news::Entity as News;
pub use super::silver_charts::Entity as SilverCharts;
pub use super::silver_prices::Entity as SilverPrices;
