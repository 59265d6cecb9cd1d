//! HTTP handlers. Reads go straight to storage; scrape triggers call the
//! same job instances the scheduler drives.

pub mod chart;
pub mod health;
pub mod jobs;
pub mod news;
pub mod silver_price;

use axum::{http::StatusCode, Json};
use tracing::{error, warn};

use crate::error::{ScrapeError, StorageError};
use crate::models::response::ApiMessage;

pub type ApiError = (StatusCode, Json<ApiMessage>);

pub(crate) fn storage_error(context: &str, e: StorageError) -> ApiError {
    error!(error = %e, "{}", context);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiMessage::failure(context)),
    )
}

pub(crate) fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ApiMessage::failure(message)))
}

/// 409 while the job is already running, 500 for anything else.
pub(crate) fn scrape_error(job: &str, e: ScrapeError) -> ApiError {
    match e {
        ScrapeError::AlreadyRunning(_) => {
            warn!(job, "Manual scrape refused, run already in progress");
            (
                StatusCode::CONFLICT,
                Json(ApiMessage::failure(format!("{} is already running", job))),
            )
        }
        e => {
            error!(job, stage = e.stage(), error = %e, "Manual scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure(format!("Scrape failed at {}: {}", e.stage(), e))),
            )
        }
    }
}
