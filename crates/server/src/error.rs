use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{
    integration::IntegrationError, page::PageError, task::TaskError, user::UserError,
};
use services::services::git_hosting::GitHostingError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    GitHosting(#[from] GitHostingError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Task(TaskError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Page(PageError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Page(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Integration(IntegrationError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::User(UserError::EmailTaken) => StatusCode::CONFLICT,
            ApiError::User(UserError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::User(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::GitHosting(GitHostingError::NotConnected) => StatusCode::NOT_FOUND,
            ApiError::GitHosting(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let error_message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            other => other.to_string(),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
