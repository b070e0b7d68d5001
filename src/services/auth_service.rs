//! Domain service for authentication, sessions and the signed-in user's profile.
//!
//! Sessions are a short-lived access token plus a rotating refresh token
//! that is persisted so it can be revoked.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication and user management.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Login/refresh result: the session tokens and who they belong to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct RootUserInput {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub designation: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown, inactive or
    /// wrongly authenticated user.
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    /// Exchanges a refresh token for a new session. The old token is revoked.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the token is malformed, expired,
    /// revoked or unknown.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError>;

    /// Revokes the refresh token. Unknown tokens are ignored.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Resolves an access token to its active user.
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError>;

    async fn get_profile(&self, user_id: i32) -> Result<User, AuthError>;

    async fn update_profile(
        &self,
        user_id: i32,
        name: Option<String>,
        designation: Option<String>,
    ) -> Result<User, AuthError>;

    /// Changes the password and ends every session of the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong or
    /// the new one equals it.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// True once a root user exists.
    async fn setup_complete(&self) -> Result<bool, AuthError>;

    /// Creates the first root user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if a root user already exists.
    async fn create_root_user(&self, input: RootUserInput) -> Result<User, AuthError>;
}
