use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use db::models::user::{CreateUser, User};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::hash_password, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub full_name: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<ResponseJson<ApiResponse<AuthenticatedUser>>, ApiError> {
    if payload.full_name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::BadRequest("name and email are required".to_string()));
    }

    let digest = hash_password(&payload.password);
    let user = User::create(&state.db.pool, &payload.full_name, &payload.email, &digest).await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        AuthenticatedUser {
            user_id: user.id,
            full_name: user.full_name,
        },
        "Signup successful",
    )))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthenticatedUser>>, ApiError> {
    let digest = hash_password(&payload.password);
    let user = User::find_by_credentials(&state.db.pool, &payload.email, &digest).await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        AuthenticatedUser {
            user_id: user.id,
            full_name: user.full_name,
        },
        "Login successful",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/signup", post(signup))
            .route("/login", post(login)),
    )
}
