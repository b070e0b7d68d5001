use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_app_description, validate_app_name};
use super::{ApiError, ApiResponse, AppState, RootActor};
use crate::db::{AppSettings, SettingsChanges};
use crate::domain::Theme;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub app_name: Option<String>,
    pub app_description: Option<String>,
    pub default_theme: Option<Theme>,
    pub enable_notifications: Option<bool>,
}

/// `GET /api/settings`
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AppSettings>>, ApiError> {
    let settings = state.settings_service().get().await?;
    Ok(Json(ApiResponse::success(settings)))
}

/// `PUT /api/settings` (root only)
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    RootActor(_): RootActor,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<AppSettings>>, ApiError> {
    let changes = SettingsChanges {
        app_name: payload
            .app_name
            .as_deref()
            .map(validate_app_name)
            .transpose()?
            .map(str::to_string),
        app_description: payload
            .app_description
            .as_deref()
            .map(validate_app_description)
            .transpose()?
            .map(str::to_string),
        default_theme: payload.default_theme,
        enable_notifications: payload.enable_notifications,
    };

    let settings = state.settings_service().update(changes).await?;
    Ok(Json(ApiResponse::success(settings)))
}
