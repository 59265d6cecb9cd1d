use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One day's published silver price, keyed by its date text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub id: i32,
    pub date: String,
    /// Domestic price (KRW per reference weight)
    pub price_krw: i64,
    /// Secondary currency figure (USD)
    pub price_usd: i64,
    /// Price per troy ounce
    pub price_ounce: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A fully normalised observation ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceObservation {
    pub date: String,
    pub price_krw: i64,
    pub price_usd: i64,
    pub price_ounce: i64,
}
