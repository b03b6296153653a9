use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use services::services::dashboard::DashboardSummary;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

use super::tasks::UserQuery;

pub async fn get_dashboard_summary(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<DashboardSummary>>, ApiError> {
    let summary = DashboardSummary::fetch_for_user(&state.db.pool, query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/dashboard",
        Router::new().route("/summary", get(get_dashboard_summary)),
    )
}
