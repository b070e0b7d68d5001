use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_colors, validate_column_title, validate_id};
use super::{ApiError, ApiResponse, AppState, Deleted, RootActor};
use crate::db::BoardColumn;
use crate::services::ColumnOrder;

#[derive(Debug, Deserialize)]
pub struct ColumnListQuery {
    #[serde(default)]
    pub show_archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateColumnRequest {
    pub title: String,
    pub colors: Option<String>,
}

/// An empty `colors` string clears the value.
#[derive(Debug, Deserialize)]
pub struct UpdateColumnRequest {
    pub title: Option<String>,
    pub colors: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderColumnsRequest {
    pub columns: Vec<ColumnOrder>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTasksRequest {
    pub target_column_id: i32,
}

#[derive(Debug, Serialize)]
pub struct MoveTasksResponse {
    pub from: i32,
    pub to: i32,
    pub moved: u64,
}

fn clean_colors(colors: Option<String>) -> Result<Option<String>, ApiError> {
    colors
        .as_deref()
        .map(|c| validate_colors(c).map(str::to_string))
        .transpose()
}

/// `GET /api/columns`
pub async fn list_columns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ColumnListQuery>,
) -> Result<Json<ApiResponse<Vec<BoardColumn>>>, ApiError> {
    let columns = state.column_service().list(query.show_archived).await?;
    Ok(Json(ApiResponse::success(columns)))
}

/// `GET /api/columns/{id}`
pub async fn get_column(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BoardColumn>>, ApiError> {
    let column = state.column_service().get(validate_id(id)?).await?;
    Ok(Json(ApiResponse::success(column)))
}

/// `POST /api/columns` (root only)
pub async fn create_column(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Json(payload): Json<CreateColumnRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BoardColumn>>), ApiError> {
    let title = validate_column_title(&payload.title)?;
    let colors = clean_colors(payload.colors)?.filter(|c| !c.is_empty());

    let column = state
        .column_service()
        .create(actor, title, colors)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(column))))
}

/// `PUT /api/columns/{id}` (root only)
pub async fn update_column(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateColumnRequest>,
) -> Result<Json<ApiResponse<BoardColumn>>, ApiError> {
    let title = payload
        .title
        .as_deref()
        .map(validate_column_title)
        .transpose()?
        .map(str::to_string);
    let colors = clean_colors(payload.colors)?;

    let column = state
        .column_service()
        .update(actor, validate_id(id)?, title, colors)
        .await?;
    Ok(Json(ApiResponse::success(column)))
}

/// `DELETE /api/columns/{id}` (root only)
///
/// Refused with 409 for the last column or a column that still holds tasks.
pub async fn delete_column(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = validate_id(id)?;
    state.column_service().delete(actor, id).await?;
    Ok(Json(ApiResponse::success(Deleted { id })))
}

/// `POST /api/columns/{id}/archive` (root only)
pub async fn archive_column(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BoardColumn>>, ApiError> {
    let column = state
        .column_service()
        .archive(actor, validate_id(id)?)
        .await?;
    Ok(Json(ApiResponse::success(column)))
}

/// `POST /api/columns/{id}/unarchive` (root only)
pub async fn unarchive_column(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BoardColumn>>, ApiError> {
    let column = state
        .column_service()
        .unarchive(actor, validate_id(id)?)
        .await?;
    Ok(Json(ApiResponse::success(column)))
}

/// `POST /api/columns/reorder` (root only)
pub async fn reorder_columns(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Json(payload): Json<ReorderColumnsRequest>,
) -> Result<Json<ApiResponse<Vec<BoardColumn>>>, ApiError> {
    if payload.columns.is_empty() {
        return Err(ApiError::validation("At least one column is required"));
    }
    for order in &payload.columns {
        validate_id(order.id)?;
        if order.position < 1 {
            return Err(ApiError::validation("Column positions start at 1"));
        }
    }

    let columns = state
        .column_service()
        .reorder(actor, &payload.columns)
        .await?;
    Ok(Json(ApiResponse::success(columns)))
}

/// `POST /api/columns/{id}/move-tasks` (root only)
///
/// Moves every task of the column behind the tail of `target_column_id`.
pub async fn move_all_tasks(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
    Json(payload): Json<MoveTasksRequest>,
) -> Result<Json<ApiResponse<MoveTasksResponse>>, ApiError> {
    let from = validate_id(id)?;
    let to = validate_id(payload.target_column_id)?;

    let moved = state.column_service().move_all_tasks(actor, from, to).await?;
    Ok(Json(ApiResponse::success(MoveTasksResponse {
        from,
        to,
        moved,
    })))
}
