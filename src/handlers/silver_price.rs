//! Silver price handlers
//!
//! GET  /api/silver-prices
//! GET  /api/silver-prices/latest
//! POST /api/silver-prices/scrape

use axum::{extract::State, Json};
use tracing::info;

use super::{not_found, scrape_error, storage_error, ApiError};
use crate::jobs::silver_price_scraper::SilverPriceScraper;
use crate::models::response::ApiMessage;
use crate::models::silver_price::PriceObservation;
use crate::AppState;

/// All stored observations, newest date first.
pub async fn get_silver_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceObservation>>, ApiError> {
    let prices = state
        .storage
        .list_price_observations()
        .await
        .map_err(|e| storage_error("Failed to fetch silver prices", e))?;

    Ok(Json(prices))
}

/// The most recent observation; 404 before the first successful scrape.
pub async fn get_latest_silver_price(
    State(state): State<AppState>,
) -> Result<Json<PriceObservation>, ApiError> {
    state
        .storage
        .get_latest_price_observation()
        .await
        .map_err(|e| storage_error("Failed to fetch latest silver price", e))?
        .map(Json)
        .ok_or_else(|| not_found("No silver price data available"))
}

pub async fn scrape_silver_price(State(state): State<AppState>) -> Result<Json<ApiMessage>, ApiError> {
    info!("Manual silver price scrape requested");

    let price = state
        .silver_price_scraper
        .scrape()
        .await
        .map_err(|e| scrape_error(SilverPriceScraper::NAME, e))?;

    Ok(Json(ApiMessage::ok(format!(
        "Silver price scraped for {}",
        price.date
    ))))
}
