use axum::{extract::State, Json};
use tracing::info;

use super::{not_found, scrape_error, storage_error, ApiError};
use crate::jobs::chart_scraper::ChartScraper;
use crate::models::chart::ChartSnapshot;
use crate::models::response::ApiMessage;
use crate::AppState;

/// GET /api/silver-chart
pub async fn get_silver_chart(State(state): State<AppState>) -> Result<Json<ChartSnapshot>, ApiError> {
    state
        .storage
        .get_chart_snapshot()
        .await
        .map_err(|e| storage_error("Failed to fetch silver chart", e))?
        .map(Json)
        .ok_or_else(|| not_found("No chart data available"))
}

/// POST /api/silver-chart/scrape
pub async fn scrape_silver_chart(State(state): State<AppState>) -> Result<Json<ApiMessage>, ApiError> {
    info!("Manual chart scrape requested");

    state
        .chart_scraper
        .scrape()
        .await
        .map_err(|e| scrape_error(ChartScraper::NAME, e))?;

    Ok(Json(ApiMessage::ok("Silver chart updated")))
}
