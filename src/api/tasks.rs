//! Task endpoints.
//!
//! Handlers only validate and map JSON; ordering, ownership and the activity
//! trail live in [`TaskService`](crate::services::TaskService).

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::nullable;
use super::validation::{
    validate_id, validate_page, validate_search_query, validate_task_title, validate_timestamp,
    validate_weight,
};
use super::{ApiError, ApiResponse, AppState, Deleted, Paginated, RootActor};
use crate::db::{SortDirection, TaskChanges, TaskDetails, TaskFilter, TaskSortField};
use crate::domain::{Actor, Priority};
use crate::services::CreateTaskInput;

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub search: Option<String>,
    pub column_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub created_by: Option<i32>,
    pub priority: Option<Priority>,
    pub due_from: Option<String>,
    pub due_to: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    #[serde(default)]
    pub order_by: TaskSortField,
    #[serde(default)]
    pub order_dir: SortDirection,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub column_id: i32,
    pub assigned_to: Option<i32>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub weight: i32,
}

/// `assigned_to` and `due_date` accept `null` to clear the value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub column_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_to: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub weight: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub column_id: i32,
    pub position: i32,
}

fn optional_timestamp(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            validate_timestamp(field, v.trim())?;
            Ok(Some(v.trim().to_string()))
        }
        _ => Ok(None),
    }
}

impl TaskListQuery {
    fn into_filter(self) -> Result<TaskFilter, ApiError> {
        let (page, limit) = validate_page(self.page, self.limit)?;

        let search = match self.search.as_deref() {
            Some(q) if !q.trim().is_empty() => Some(validate_search_query(q)?.to_string()),
            _ => None,
        };

        Ok(TaskFilter {
            search,
            column_id: self.column_id,
            assigned_to: self.assigned_to,
            created_by: self.created_by,
            priority: self.priority,
            due_from: optional_timestamp("due_from", self.due_from)?,
            due_to: optional_timestamp("due_to", self.due_to)?,
            created_from: optional_timestamp("created_from", self.created_from)?,
            created_to: optional_timestamp("created_to", self.created_to)?,
            order_by: self.order_by,
            order_dir: self.order_dir,
            page,
            limit,
        })
    }
}

impl UpdateTaskRequest {
    fn into_changes(self) -> Result<TaskChanges, ApiError> {
        let title = self
            .title
            .as_deref()
            .map(validate_task_title)
            .transpose()?
            .map(str::to_string);

        let due_date = match self.due_date {
            Some(Some(date)) => Some(optional_timestamp("due_date", Some(date))?),
            Some(None) => Some(None),
            None => None,
        };

        if let Some(column_id) = self.column_id {
            validate_id(column_id)?;
        }

        Ok(TaskChanges {
            title,
            description: self.description,
            column_id: self.column_id,
            assigned_to: self.assigned_to,
            due_date,
            priority: self.priority,
            weight: self.weight.map(validate_weight).transpose()?,
        })
    }
}

/// `GET /api/tasks`
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<ApiResponse<Paginated<TaskDetails>>>, ApiError> {
    let filter = query.into_filter()?;
    let (tasks, total) = state.task_service().list(&filter).await?;
    Ok(Json(ApiResponse::success(Paginated::new(
        tasks,
        total,
        filter.page,
        filter.limit,
    ))))
}

/// `POST /api/tasks`
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskDetails>>), ApiError> {
    let input = CreateTaskInput {
        title: validate_task_title(&payload.title)?.to_string(),
        description: payload.description.filter(|d| !d.trim().is_empty()),
        column_id: validate_id(payload.column_id)?,
        assigned_to: payload.assigned_to,
        due_date: optional_timestamp("due_date", payload.due_date)?,
        priority: payload.priority,
        weight: validate_weight(payload.weight)?,
    };

    let task = state.task_service().create(actor, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(task))))
}

/// `GET /api/tasks/{id}`
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TaskDetails>>, ApiError> {
    let task = state.task_service().get(validate_id(id)?).await?;
    Ok(Json(ApiResponse::success(task)))
}

/// `PUT /api/tasks/{id}`
///
/// Only the creator or a root user may edit.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<TaskDetails>>, ApiError> {
    let changes = payload.into_changes()?;
    let task = state
        .task_service()
        .update(actor, validate_id(id)?, changes)
        .await?;
    Ok(Json(ApiResponse::success(task)))
}

/// `POST /api/tasks/{id}/move`
pub async fn move_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<MoveTaskRequest>,
) -> Result<Json<ApiResponse<TaskDetails>>, ApiError> {
    let task = state
        .task_service()
        .move_task(
            actor,
            validate_id(id)?,
            validate_id(payload.column_id)?,
            payload.position,
        )
        .await?;
    Ok(Json(ApiResponse::success(task)))
}

/// `DELETE /api/tasks/{id}`
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = validate_id(id)?;
    state.task_service().delete(actor, id).await?;
    Ok(Json(ApiResponse::success(Deleted { id })))
}

/// `PUT /api/admin/tasks/{id}/force-update`
pub async fn force_update_task(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<TaskDetails>>, ApiError> {
    let changes = payload.into_changes()?;
    let task = state
        .task_service()
        .update(actor, validate_id(id)?, changes)
        .await?;
    Ok(Json(ApiResponse::success(task)))
}

/// `DELETE /api/admin/tasks/{id}`
pub async fn force_delete_task(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = validate_id(id)?;
    state.task_service().delete(actor, id).await?;
    Ok(Json(ApiResponse::success(Deleted { id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_tri_state() {
        let payload: UpdateTaskRequest =
            serde_json::from_str(r#"{"assigned_to": null, "title": "Renamed"}"#).unwrap();
        let changes = payload.into_changes().unwrap();
        assert_eq!(changes.assigned_to, Some(None));
        assert_eq!(changes.due_date, None);
        assert_eq!(changes.title.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_update_request_rejects_bad_due_date() {
        let payload: UpdateTaskRequest =
            serde_json::from_str(r#"{"due_date": "tomorrow"}"#).unwrap();
        assert!(payload.into_changes().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: TaskListQuery = serde_json::from_str("{}").unwrap();
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.order_by, TaskSortField::Position);
    }
}
