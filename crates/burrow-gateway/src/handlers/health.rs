use crate::error::Result;
use crate::model::HealthResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// Liveness of the process itself; never touches storage.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness of the storage backend.
pub async fn ping_handler(State(state): State<AppState>) -> Result<StatusCode> {
    let ctx = state.request_context();
    state.shortener().ping(&ctx).await?;
    Ok(StatusCode::OK)
}
