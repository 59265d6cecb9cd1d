use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The single stored chart image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub id: i32,
    pub image_url: String,
    /// Base64-encoded image bytes
    pub image_data: String,
    pub last_updated: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChartSnapshot {
    pub image_url: String,
    pub image_data: String,
    pub last_updated: NaiveDateTime,
}
