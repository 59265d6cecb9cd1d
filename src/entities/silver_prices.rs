//! `SeaORM` Entity for silver_prices table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "silver_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Published date exactly as the upstream table prints it (YYYY/MM/DD)
    #[sea_orm(unique)]
    pub date: String,
    pub price_krw: i64,
    pub price_usd: i64,
    pub price_ounce: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
