use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_activity_limit, validate_id};
use super::{ApiError, ApiResponse, AppState, RootActor};
use crate::db::ActivityEntry;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct PruneRequest {
    pub days: u32,
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    pub days: u32,
    pub deleted: u64,
}

/// `GET /api/activities?limit&offset`
///
/// Board-wide feed, newest first.
pub async fn recent_activities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityEntry>>>, ApiError> {
    let limit = validate_activity_limit(query.limit)?;
    let entries = state
        .activity_service()
        .recent(limit, query.offset)
        .await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// `GET /api/activities/task/{task_id}`
pub async fn task_activities(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ActivityEntry>>>, ApiError> {
    let entries = state
        .activity_service()
        .for_task(validate_id(task_id)?)
        .await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// `GET /api/activities/{id}`
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActivityEntry>>, ApiError> {
    let entry = state.activity_service().get(validate_id(id)?).await?;
    Ok(Json(ApiResponse::success(entry)))
}

/// `POST /api/admin/activities/prune` (root only)
pub async fn prune_activities(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Json(payload): Json<PruneRequest>,
) -> Result<Json<ApiResponse<PruneResponse>>, ApiError> {
    let deleted = state.activity_service().prune(payload.days).await?;
    Ok(Json(ApiResponse::success(PruneResponse {
        days: payload.days,
        deleted,
    })))
}
