use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use timekeeper_types::Meeting;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// List all meetings
#[utoipa::path(
    get,
    path = "/api/meetings",
    responses(
        (status = 200, description = "All stored meetings", body = [Meeting])
    ),
    tag = "meetings"
)]
pub async fn list_meetings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Meeting>>> {
    Ok(Json(state.store.list_meetings().await?))
}

/// Store a meeting
///
/// A meeting with an id that already exists replaces it.
#[utoipa::path(
    post,
    path = "/api/meetings",
    request_body = Meeting,
    responses(
        (status = 201, description = "Meeting stored", body = Meeting),
        (status = 400, description = "Invalid request")
    ),
    tag = "meetings"
)]
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Json(meeting): Json<Meeting>,
) -> ApiResult<(StatusCode, Json<Meeting>)> {
    if meeting.id.trim().is_empty() {
        return Err(ApiError::BadRequest("meeting id must not be empty".to_string()));
    }

    let meeting = state.store.create_meeting(meeting).await?;
    tracing::info!(meeting_id = %meeting.id, "Meeting stored");

    Ok((StatusCode::CREATED, Json(meeting)))
}

/// Merge fields into a stored meeting
#[utoipa::path(
    put,
    path = "/api/meetings/{id}",
    params(
        ("id" = String, Path, description = "Meeting id")
    ),
    request_body(content = Object, description = "Fields to overwrite; the id is kept"),
    responses(
        (status = 200, description = "Updated meeting", body = Meeting),
        (status = 400, description = "Update does not produce a valid meeting"),
        (status = 404, description = "Meeting not found")
    ),
    tag = "meetings"
)]
pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Meeting>> {
    let meeting = state.store.update_meeting(&id, patch).await?;
    tracing::info!(meeting_id = %id, status = ?meeting.status, "Meeting updated");

    Ok(Json(meeting))
}

/// Delete a meeting
///
/// Succeeds whether or not the meeting existed.
#[utoipa::path(
    delete,
    path = "/api/meetings/{id}",
    params(
        ("id" = String, Path, description = "Meeting id")
    ),
    responses(
        (status = 204, description = "Meeting deleted")
    ),
    tag = "meetings"
)]
pub async fn delete_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_meeting(&id).await?;
    tracing::info!(meeting_id = %id, "Meeting deleted");

    Ok(StatusCode::NO_CONTENT)
}
