use axum::{extract::State, Json};
use chrono::Utc;

use crate::models::response::HealthResponse;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        storage: state.storage.backend_name().to_string(),
    })
}
