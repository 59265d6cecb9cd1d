use axum::{extract::State, Json};

use crate::services::job_status::JobStatus;
use crate::AppState;

/// GET /api/jobs
///
/// Last attempt, last success and last error of every scrape job.
pub async fn get_job_statuses(State(state): State<AppState>) -> Json<Vec<JobStatus>> {
    Json(state.job_status.snapshot())
}
