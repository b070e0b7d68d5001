use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_comment, validate_id};
use super::{ApiError, ApiResponse, AppState, Deleted};
use crate::db::CommentView;
use crate::domain::Actor;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub task_id: i32,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// `POST /api/comments`
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentView>>), ApiError> {
    let content = validate_comment(&payload.content)?;
    let comment = state
        .comment_service()
        .create(actor, validate_id(payload.task_id)?, content)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

/// `GET /api/comments/task/{task_id}`
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<CommentView>>>, ApiError> {
    let comments = state
        .comment_service()
        .list_for_task(validate_id(task_id)?)
        .await?;
    Ok(Json(ApiResponse::success(comments)))
}

/// `GET /api/comments/{id}`
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CommentView>>, ApiError> {
    let comment = state.comment_service().get(validate_id(id)?).await?;
    Ok(Json(ApiResponse::success(comment)))
}

/// `PUT /api/comments/{id}`
///
/// Author only, root included.
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<ApiResponse<CommentView>>, ApiError> {
    let content = validate_comment(&payload.content)?;
    let comment = state
        .comment_service()
        .update(actor, validate_id(id)?, content)
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

/// `DELETE /api/comments/{id}`
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = validate_id(id)?;
    state.comment_service().delete(actor, id).await?;
    Ok(Json(ApiResponse::success(Deleted { id })))
}
