//! User administration (root only) and the assignee picker search.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    validate_id, validate_page, validate_password, validate_profile_field, validate_search_query,
    validate_username,
};
use super::{ApiError, ApiResponse, AppState, Message, Paginated, RootActor};
use crate::db::{NewUser, User, UserChanges, UserFilter};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub is_root: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub designation: Option<String>,
    #[serde(default)]
    pub is_root: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub is_root: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

/// `GET /api/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Paginated<User>>>, ApiError> {
    let (page, limit) = validate_page(query.page, query.limit)?;
    let filter = UserFilter {
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        is_active: query.is_active,
        is_root: query.is_root,
        page,
        limit,
    };

    let (users, total) = state.user_service().list(&filter).await?;
    Ok(Json(ApiResponse::success(Paginated::new(
        users, total, page, limit,
    ))))
}

/// `GET /api/users/search?q=`
///
/// Active users only. Available to every signed-in user.
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let users = state.user_service().search(q).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service().get(validate_id(id)?).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let input = NewUser {
        username: validate_username(&payload.username)?.to_string(),
        password: validate_password(&payload.password)?.to_string(),
        name: validate_profile_field("Name", payload.name.as_deref())?
            .filter(|n| !n.is_empty()),
        designation: validate_profile_field("Designation", payload.designation.as_deref())?
            .filter(|d| !d.is_empty()),
        is_root: payload.is_root,
    };

    let user = state.user_service().create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// `PUT /api/users/{id}`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let changes = UserChanges {
        username: payload
            .username
            .as_deref()
            .map(validate_username)
            .transpose()?
            .map(str::to_string),
        name: validate_profile_field("Name", payload.name.as_deref())?,
        designation: validate_profile_field("Designation", payload.designation.as_deref())?,
        is_root: payload.is_root,
    };

    let user = state
        .user_service()
        .update(validate_id(id)?, changes)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `POST /api/users/{id}/archive`
///
/// Deactivates the account and ends its sessions. Root users cannot archive themselves.
pub async fn archive_user(
    State(state): State<Arc<AppState>>,
    RootActor(actor): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state
        .user_service()
        .archive(actor, validate_id(id)?)
        .await?;
    Ok(Json(ApiResponse::success(Message::new("User archived"))))
}

/// `POST /api/users/{id}/unarchive`
pub async fn unarchive_user(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state.user_service().unarchive(validate_id(id)?).await?;
    Ok(Json(ApiResponse::success(Message::new("User restored"))))
}

/// `PUT /api/users/{id}/password`
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Path(id): Path<i32>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let password = validate_password(&payload.password)?;
    state
        .user_service()
        .set_password(validate_id(id)?, password)
        .await?;
    Ok(Json(ApiResponse::success(Message::new("Password updated"))))
}
