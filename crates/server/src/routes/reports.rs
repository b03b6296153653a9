use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use services::services::report::SprintReport;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

use super::tasks::UserQuery;

pub async fn get_sprint_report(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<SprintReport>>, ApiError> {
    let report = SprintReport::fetch_for_user(&state.db.pool, query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/reports",
        Router::new().route("/sprints", get(get_sprint_report)),
    )
}
