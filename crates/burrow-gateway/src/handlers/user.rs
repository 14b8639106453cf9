use crate::error::Result;
use crate::extract::UserId;
use crate::model::UserUrl;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::{ShortCode, ShortenerError};
use tracing::warn;

/// `GET /api/user/urls`: the caller's live URLs, or 204 when there are none.
pub async fn user_urls_handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Response> {
    let ctx = state.request_context();
    let records = state.shortener().user_urls(&ctx, &user_id).await?;

    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let urls: Vec<UserUrl> = records.into_iter().map(UserUrl::from).collect();
    Ok(Json(urls).into_response())
}

/// `DELETE /api/user/urls` with a JSON array of short codes.
///
/// Responds 202 once the request is validated; deletion runs in the
/// background and failures are only logged.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: std::result::Result<Json<Vec<String>>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(raw) = payload?;
    let codes = raw
        .into_iter()
        .map(ShortCode::new)
        .collect::<std::result::Result<Vec<_>, ShortenerError>>()?;

    let shortener = state.shortener();
    let ctx = state.request_context();
    tokio::spawn(async move {
        let count = codes.len();
        if let Err(err) = shortener.delete_user_urls(&ctx, &user_id, codes).await {
            warn!(user_id = %user_id, count, error = %err, "background url deletion failed");
        }
    });

    Ok(StatusCode::ACCEPTED)
}
