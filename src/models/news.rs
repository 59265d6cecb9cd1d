use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NEWS_CATEGORY: &str = "precious-metals";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: NaiveDateTime,
    pub category: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNewsItem {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: NaiveDateTime,
    pub category: String,
}
