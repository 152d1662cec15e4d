use axum::{Json, Router, routing::get};
use storage::dto::common::HealthResponse;

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
