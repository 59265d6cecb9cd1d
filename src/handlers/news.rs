//! News handlers

use axum::{extract::State, Json};
use tracing::info;

use super::{scrape_error, storage_error, ApiError};
use crate::jobs::news_scraper::NewsScraper;
use crate::models::news::NewsItem;
use crate::models::response::{ApiMessage, ClearNewsResponse};
use crate::AppState;

/// GET /api/news, capped at the configured display limit
pub async fn get_news(State(state): State<AppState>) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let items = state
        .storage
        .list_news_items(Some(state.news_display_limit))
        .await
        .map_err(|e| storage_error("Failed to fetch news", e))?;

    Ok(Json(items))
}

/// GET /api/news/all
pub async fn get_all_news(State(state): State<AppState>) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let items = state
        .storage
        .list_news_items(None)
        .await
        .map_err(|e| storage_error("Failed to fetch news", e))?;

    Ok(Json(items))
}

/// POST /api/news/scrape
pub async fn scrape_news(State(state): State<AppState>) -> Result<Json<ApiMessage>, ApiError> {
    info!("Manual news scrape requested");

    let summary = state
        .news_scraper
        .scrape()
        .await
        .map_err(|e| scrape_error(NewsScraper::NAME, e))?;

    Ok(Json(ApiMessage::ok(format!(
        "News scraped: {} inserted, {} duplicates skipped, {} sources failed",
        summary.inserted, summary.skipped_duplicates, summary.sources_failed
    ))))
}

/// DELETE /api/news
pub async fn clear_news(State(state): State<AppState>) -> Result<Json<ClearNewsResponse>, ApiError> {
    let deleted = state
        .storage
        .clear_news_items()
        .await
        .map_err(|e| storage_error("Failed to clear news", e))?;

    info!(deleted, "News cleared");

    Ok(Json(ClearNewsResponse {
        success: true,
        deleted,
    }))
}
