//! First-run endpoints. All of them are public.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_password, validate_profile_field, validate_username};
use super::{ApiError, ApiResponse, AppState};
use crate::db::{AppSettings, User};
use crate::services::RootUserInput;

#[derive(Debug, Serialize)]
pub struct SetupStatus {
    pub setup_complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRootUserRequest {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub designation: Option<String>,
}

/// `GET /api/setup/status`
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SetupStatus>>, ApiError> {
    let setup_complete = state.auth_service().setup_complete().await?;
    Ok(Json(ApiResponse::success(SetupStatus { setup_complete })))
}

/// `POST /api/setup/root-user`
///
/// Only accepted while no root user exists; afterwards answers 409.
pub async fn create_root_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRootUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let input = RootUserInput {
        username: validate_username(&payload.username)?.to_string(),
        password: validate_password(&payload.password)?.to_string(),
        name: validate_profile_field("Name", payload.name.as_deref())?.filter(|n| !n.is_empty()),
        designation: validate_profile_field("Designation", payload.designation.as_deref())?
            .filter(|d| !d.is_empty()),
    };

    let user = state.auth_service().create_root_user(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// `GET /api/setup/settings`
///
/// Branding for the login screen, readable before anyone signs in.
pub async fn public_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AppSettings>>, ApiError> {
    let settings = state.settings_service().get().await?;
    Ok(Json(ApiResponse::success(settings)))
}
