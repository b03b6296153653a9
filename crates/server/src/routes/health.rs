use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database_ready: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ready = sqlx::query("SELECT 1")
        .fetch_one(&state.db.pool)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if database_ready { "ok" } else { "degraded" },
        database_ready,
    })
}
