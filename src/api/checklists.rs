use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_checklist_title, validate_id};
use super::{ApiError, ApiResponse, AppState, Deleted};
use crate::db::ChecklistItem;
use crate::domain::Actor;

#[derive(Debug, Deserialize)]
pub struct ChecklistItemRequest {
    pub title: String,
}

/// `GET /api/tasks/{id}/checklists`
pub async fn list_checklist(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ChecklistItem>>>, ApiError> {
    let items = state
        .checklist_service()
        .list_for_task(validate_id(task_id)?)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// `POST /api/tasks/{id}/checklists`
pub async fn create_checklist_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<i32>,
    Json(payload): Json<ChecklistItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChecklistItem>>), ApiError> {
    let title = validate_checklist_title(&payload.title)?;
    let item = state
        .checklist_service()
        .create(actor, validate_id(task_id)?, title)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// `PUT /api/checklists/{id}`
pub async fn rename_checklist_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<ChecklistItemRequest>,
) -> Result<Json<ApiResponse<ChecklistItem>>, ApiError> {
    let title = validate_checklist_title(&payload.title)?;
    let item = state
        .checklist_service()
        .rename(actor, validate_id(id)?, title)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// `POST /api/checklists/{id}/toggle`
pub async fn toggle_checklist_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ChecklistItem>>, ApiError> {
    let item = state
        .checklist_service()
        .toggle(actor, validate_id(id)?)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// `DELETE /api/checklists/{id}`
pub async fn delete_checklist_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = validate_id(id)?;
    state.checklist_service().delete(actor, id).await?;
    Ok(Json(ApiResponse::success(Deleted { id })))
}
