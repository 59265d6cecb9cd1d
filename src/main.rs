use std::sync::Arc;

use silver_price_backend::{
    config::AppConfig,
    jobs::scheduler::{start_scheduler, ScheduledJob},
    router::build_router,
    scrapers::{Fetcher, HttpFetcher},
    storage, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,silver_price_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let storage = storage::connect(&config.storage)
        .await
        .expect("Failed to initialise storage");
    tracing::info!(backend = storage.backend_name(), "Storage ready");

    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::new(&config.scraper).expect("Failed to build HTTP client"));

    let state = AppState::new(
        storage,
        fetcher,
        &config.scraper,
        config.news_display_limit,
    )
    .expect("Invalid price table selector");

    // Held for the lifetime of the process; dropping it stops the triggers
    let _scheduler = start_scheduler(
        config.schedule.timezone,
        vec![
            ScheduledJob::new(
                state.silver_price_scraper.clone(),
                config.schedule.price_crons.clone(),
            ),
            ScheduledJob::new(state.news_scraper.clone(), config.schedule.news_crons.clone()),
            ScheduledJob::new(state.chart_scraper.clone(), config.schedule.chart_crons.clone()),
        ],
        config.schedule.run_on_startup,
    )
    .await
    .expect("Failed to start scheduler");

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
