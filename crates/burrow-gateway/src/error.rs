use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use burrow_core::{ShortenerError, StorageError};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("short url not found")]
    NotFound,
    /// Carries the short URL already stored for the submitted URL.
    #[error("url already shortened as {0}")]
    Duplicate(String),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidUrl(message) => AppError::BadRequest(message),
            ShortenerError::InvalidShortCode(message) => AppError::BadRequest(message),
            ShortenerError::Duplicate(existing) => AppError::Duplicate(existing),
            ShortenerError::Storage(source) => AppError::Storage(source),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "short url not found").into_response(),
            AppError::Duplicate(existing) => (StatusCode::CONFLICT, existing).into_response(),
            AppError::Storage(source) => {
                error!(error = %source, "storage operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
