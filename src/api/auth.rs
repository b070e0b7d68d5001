use axum::{
    Extension, Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_password, validate_profile_field};
use super::{ApiError, ApiResponse, AppState, Message};
use crate::db::User;
use crate::domain::Actor;
use crate::services::{AuthError, Session};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub designation: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: User,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid username or password".to_string())
            }
            AuthError::InvalidToken => Self::Unauthorized("Invalid or expired token".to_string()),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <access token>` to the active user and
/// stores both the [`User`] and its [`Actor`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let user = state.auth_service().authenticate(&token).await?;

    request
        .extensions_mut()
        .insert(Actor::new(user.id, user.is_root));
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

/// Extractor for root-only handlers. Must run behind [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct RootActor(pub Actor);

impl<S> FromRequestParts<S> for RootActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .extensions
            .get::<Actor>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        if !actor.is_root {
            return Err(ApiError::forbidden("Root access required"));
        }

        Ok(Self(actor))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let session = state
        .auth_service()
        .login(payload.username.trim(), &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(session)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let session = state
        .auth_service()
        .refresh(payload.refresh_token.trim())
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state
        .auth_service()
        .logout(payload.refresh_token.trim())
        .await?;
    Ok(Json(ApiResponse::success(Message::new("Logged out"))))
}

/// GET /auth/verify
pub async fn verify(Extension(user): Extension<User>) -> Json<ApiResponse<VerifyResponse>> {
    Json(ApiResponse::success(VerifyResponse { valid: true, user }))
}

/// GET /user/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth_service().get_profile(actor.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /user/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let name = validate_profile_field("Name", payload.name.as_deref())?;
    let designation = validate_profile_field("Designation", payload.designation.as_deref())?;

    let user = state
        .auth_service()
        .update_profile(actor.id, name, designation)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /user/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    if payload.current_password.is_empty() {
        return Err(ApiError::validation("Current password is required"));
    }
    let new_password = validate_password(&payload.new_password)?;

    state
        .auth_service()
        .change_password(actor.id, &payload.current_password, new_password)
        .await?;

    Ok(Json(ApiResponse::success(Message::new(
        "Password changed. Please sign in again.",
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
