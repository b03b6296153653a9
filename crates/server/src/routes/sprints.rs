use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::sprint::{CreateSprint, Sprint, SprintWithCounts};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

use super::tasks::UserQuery;

#[derive(Debug, Deserialize)]
pub struct ReplaceSprints {
    pub user_id: Uuid,
    #[serde(default)]
    pub project_title: Option<String>,
    pub sprints: Vec<CreateSprint>,
}

#[derive(Debug, Serialize)]
pub struct SprintListing {
    pub sprints: Vec<SprintWithCounts>,
    pub project_title: String,
    pub current_sprint: Option<Sprint>,
}

#[derive(Debug, Serialize)]
pub struct DeletedSprints {
    pub deleted: u64,
}

const DEFAULT_PROJECT_TITLE: &str = "My Project";

pub async fn get_sprints(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<SprintListing>>, ApiError> {
    let sprints = Sprint::fetch_with_counts(&state.db.pool, query.user_id).await?;
    let today = Utc::now().date_naive();

    let project_title = sprints
        .first()
        .map(|s| s.sprint.project_title.clone())
        .unwrap_or_else(|| DEFAULT_PROJECT_TITLE.to_string());
    // Overlapping windows resolve to the most recently created sprint.
    let current_sprint = sprints
        .iter()
        .rev()
        .map(|s| &s.sprint)
        .find(|s| s.is_current(today))
        .cloned();

    Ok(ResponseJson(ApiResponse::success(SprintListing {
        sprints,
        project_title,
        current_sprint,
    })))
}

pub async fn replace_sprints(
    State(state): State<AppState>,
    Json(payload): Json<ReplaceSprints>,
) -> Result<ResponseJson<ApiResponse<Vec<Sprint>>>, ApiError> {
    for sprint in &payload.sprints {
        if sprint.end_date < sprint.start_date {
            return Err(ApiError::BadRequest(format!(
                "sprint \"{}\" ends before it starts",
                sprint.title
            )));
        }
    }

    let project_title = payload
        .project_title
        .as_deref()
        .unwrap_or(DEFAULT_PROJECT_TITLE);
    let created = Sprint::replace_for_user(
        &state.db.pool,
        payload.user_id,
        project_title,
        &payload.sprints,
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        created,
        "Sprints saved",
    )))
}

pub async fn delete_sprints(
    State(state): State<AppState>,
    Json(payload): Json<UserQuery>,
) -> Result<ResponseJson<ApiResponse<DeletedSprints>>, ApiError> {
    let deleted = Sprint::delete_for_user(&state.db.pool, payload.user_id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        DeletedSprints { deleted },
        "Sprints deleted",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/sprints",
        Router::new()
            .route("/", get(get_sprints).post(replace_sprints))
            .route("/delete", post(delete_sprints)),
    )
}
