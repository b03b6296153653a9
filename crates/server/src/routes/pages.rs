use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::page::{CreatePage, Page, UpdatePage};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

use super::tasks::UserQuery;

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub page: CreatePage,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub page_id: Uuid,
    #[serde(flatten)]
    pub fields: UpdatePage,
}

#[derive(Debug, Deserialize)]
pub struct PageRef {
    pub page_id: Uuid,
}

pub async fn get_pages(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Page>>>, ApiError> {
    let pages = Page::fetch_for_user(&state.db.pool, query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(pages)))
}

pub async fn create_page(
    State(state): State<AppState>,
    Json(payload): Json<CreatePageRequest>,
) -> Result<ResponseJson<ApiResponse<Page>>, ApiError> {
    if payload.page.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let page = Page::create(&state.db.pool, payload.user_id, &payload.page).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        page,
        "Page created",
    )))
}

pub async fn update_page(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePageRequest>,
) -> Result<ResponseJson<ApiResponse<Page>>, ApiError> {
    let page = Page::update(&state.db.pool, payload.page_id, &payload.fields).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        page,
        "Page updated",
    )))
}

pub async fn delete_page(
    State(state): State<AppState>,
    Json(payload): Json<PageRef>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Page::delete(&state.db.pool, payload.page_id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Page deleted",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/pages",
        Router::new()
            .route("/", get(get_pages).post(create_page))
            .route("/update", post(update_page))
            .route("/delete", post(delete_page)),
    )
}
