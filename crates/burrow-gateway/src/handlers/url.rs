use crate::error::{AppError, Result};
use crate::extract::UserId;
use crate::model::{ShortenRequest, ShortenResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use burrow_core::{BatchItem, ShortCode, ShortenParams, ShortenerError};
use tracing::debug;

/// `POST /` with the URL as a plain text body.
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    body: String,
) -> Result<Response> {
    let ctx = state.request_context();
    let params = ShortenParams {
        original_url: body.trim().to_string(),
        user_id,
    };

    match state.shortener().shorten(&ctx, params).await {
        Ok(short_url) => Ok((StatusCode::CREATED, short_url).into_response()),
        Err(ShortenerError::Duplicate(existing)) => {
            Ok((StatusCode::CONFLICT, existing).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /api/shorten` with `{"url": "..."}`.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let ctx = state.request_context();
    let params = ShortenParams {
        original_url: request.url,
        user_id,
    };

    match state.shortener().shorten(&ctx, params).await {
        Ok(result) => Ok((StatusCode::CREATED, Json(ShortenResponse { result })).into_response()),
        Err(ShortenerError::Duplicate(existing)) => Ok((
            StatusCode::CONFLICT,
            Json(ShortenResponse { result: existing }),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// `POST /api/shorten/batch`. Either every item is stored or none is.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: std::result::Result<Json<Vec<BatchItem>>, JsonRejection>,
) -> Result<Response> {
    let Json(items) = payload?;
    if items.is_empty() {
        return Err(AppError::BadRequest("batch is empty".to_string()));
    }

    let ctx = state.request_context();
    match state.shortener().shorten_batch(&ctx, &user_id, items).await {
        Ok(shortened) => {
            debug!(count = shortened.len(), "batch shortened");
            Ok((StatusCode::CREATED, Json(shortened)).into_response())
        }
        Err(ShortenerError::Duplicate(existing)) => Ok((
            StatusCode::CONFLICT,
            Json(ShortenResponse { result: existing }),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// `GET /{id}`: temporary redirect to the original URL.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    // A malformed code can never have been issued.
    let code = ShortCode::new(id).map_err(|_| AppError::NotFound)?;

    let ctx = state.request_context();
    match state.shortener().expand(&ctx, &code).await? {
        Some(record) => Ok(Redirect::temporary(&record.original_url)),
        None => Err(AppError::NotFound),
    }
}
