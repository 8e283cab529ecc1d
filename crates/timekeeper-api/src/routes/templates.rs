use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use timekeeper_types::Template;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// List all templates
#[utoipa::path(
    get,
    path = "/api/templates",
    responses(
        (status = 200, description = "All stored templates", body = [Template])
    ),
    tag = "templates"
)]
pub async fn list_templates(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(state.store.list_templates().await?))
}

/// Store a template
#[utoipa::path(
    post,
    path = "/api/templates",
    request_body = Template,
    responses(
        (status = 201, description = "Template stored", body = Template),
        (status = 400, description = "Invalid request")
    ),
    tag = "templates"
)]
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(template): Json<Template>,
) -> ApiResult<(StatusCode, Json<Template>)> {
    if template.id.trim().is_empty() {
        return Err(ApiError::BadRequest("template id must not be empty".to_string()));
    }

    let template = state.store.create_template(template).await?;
    tracing::info!(template_id = %template.id, name = %template.name, "Template stored");

    Ok((StatusCode::CREATED, Json(template)))
}

/// Merge fields into a stored template
#[utoipa::path(
    put,
    path = "/api/templates/{id}",
    params(
        ("id" = String, Path, description = "Template id")
    ),
    request_body(content = Object, description = "Fields to overwrite; the id is kept"),
    responses(
        (status = 200, description = "Updated template", body = Template),
        (status = 400, description = "Update does not produce a valid template"),
        (status = 404, description = "Template not found")
    ),
    tag = "templates"
)]
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Template>> {
    let template = state.store.update_template(&id, patch).await?;
    tracing::info!(template_id = %id, "Template updated");

    Ok(Json(template))
}

/// Delete a template
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    params(
        ("id" = String, Path, description = "Template id")
    ),
    responses(
        (status = 204, description = "Template deleted")
    ),
    tag = "templates"
)]
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_template(&id).await?;
    tracing::info!(template_id = %id, "Template deleted");

    Ok(StatusCode::NO_CONTENT)
}
