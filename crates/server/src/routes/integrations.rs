use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::integration::{ConnectIntegration, Integration, Platform};
use serde::{Deserialize, Serialize};
use services::services::git_hosting::{self, RepoSummary};
use std::collections::BTreeMap;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

use super::tasks::UserQuery;

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub integration: ConnectIntegration,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRef {
    pub user_id: Uuid,
    pub platform: Platform,
}

/// Connection details exposed to the client. The token itself stays
/// server-side; only its presence is reported.
#[derive(Debug, Serialize)]
pub struct IntegrationView {
    pub repo_url: String,
    pub has_token: bool,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

impl From<Integration> for IntegrationView {
    fn from(integration: Integration) -> Self {
        IntegrationView {
            repo_url: integration.repo_url,
            has_token: !integration.access_token.is_empty(),
            connected_at: integration.connected_at,
        }
    }
}

pub async fn get_integrations(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<BTreeMap<String, IntegrationView>>>, ApiError> {
    let integrations = Integration::fetch_for_user(&state.db.pool, query.user_id).await?;

    let by_platform = integrations
        .into_iter()
        .map(|i| (i.platform.to_string(), IntegrationView::from(i)))
        .collect();
    Ok(ResponseJson(ApiResponse::success(by_platform)))
}

pub async fn connect_integration(
    State(state): State<AppState>,
    Json(payload): Json<ConnectRequest>,
) -> Result<ResponseJson<ApiResponse<IntegrationView>>, ApiError> {
    if payload.integration.repo_url.trim().is_empty() {
        return Err(ApiError::BadRequest("repo_url is required".to_string()));
    }

    let integration =
        Integration::upsert(&state.db.pool, payload.user_id, &payload.integration).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        IntegrationView::from(integration),
        "Integration saved",
    )))
}

pub async fn delete_integration(
    State(state): State<AppState>,
    Json(payload): Json<PlatformRef>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Integration::disconnect(&state.db.pool, payload.user_id, payload.platform).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Integration removed",
    )))
}

pub async fn get_repos(
    State(state): State<AppState>,
    Query(query): Query<PlatformRef>,
) -> Result<ResponseJson<ApiResponse<Vec<RepoSummary>>>, ApiError> {
    let repos = git_hosting::list_repos(
        &state.db.pool,
        &state.http,
        query.user_id,
        query.platform,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(repos)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/integrations",
        Router::new()
            .route("/", get(get_integrations).post(connect_integration))
            .route("/delete", post(delete_integration))
            .route("/repos", get(get_repos)),
    )
}
