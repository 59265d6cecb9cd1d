use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{chart, health, jobs, news, silver_price};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Silver prices
        .route("/api/silver-prices", get(silver_price::get_silver_prices))
        .route(
            "/api/silver-prices/latest",
            get(silver_price::get_latest_silver_price),
        )
        .route(
            "/api/silver-prices/scrape",
            post(silver_price::scrape_silver_price),
        )
        // News
        .route("/api/news", get(news::get_news).delete(news::clear_news))
        .route("/api/news/all", get(news::get_all_news))
        .route("/api/news/scrape", post(news::scrape_news))
        // Chart
        .route("/api/silver-chart", get(chart::get_silver_chart))
        .route("/api/silver-chart/scrape", post(chart::scrape_silver_chart))
        .route("/api/jobs", get(jobs::get_job_statuses))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
