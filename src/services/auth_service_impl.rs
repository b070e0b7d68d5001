//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::repositories::user::verify_password;
use crate::db::{NewUser, Store, User, UserChanges};
use crate::services::auth_service::{
    AuthError, AuthService, RootUserInput, Session, TokenPair,
};
use crate::services::token::{TokenIssuer, TokenKind};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Issues an access/refresh pair and persists the refresh token.
    async fn open_session(&self, user: User) -> Result<Session, AuthError> {
        let access = self.tokens.issue(user.id, TokenKind::Access)?;
        let refresh = self.tokens.issue(user.id, TokenKind::Refresh)?;

        self.store
            .store_refresh_token(user.id, &refresh.token, &refresh.expires_at_rfc3339())
            .await?;

        Ok(Session {
            tokens: TokenPair {
                access_token: access.token,
                refresh_token: refresh.token,
                token_type: "Bearer",
                expires_in: self.tokens.access_ttl_seconds(),
            },
            user,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let (user, password_hash) = self
            .store
            .get_user_credentials(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password_hash, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(event = "user_login", user_id = user.id, "User logged in");
        self.open_session(user).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .ok_or(AuthError::InvalidToken)?;

        let stored = self
            .store
            .find_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        if stored.is_revoked || stored.expires_at <= now {
            return Err(AuthError::InvalidToken);
        }
        if claims.user_id() != Some(stored.user_id) {
            return Err(AuthError::InvalidToken);
        }

        // Rotation: a refresh token is good for exactly one exchange.
        if !self.store.revoke_refresh_token(refresh_token).await? {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .store
            .get_user(stored.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        self.open_session(user).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        if self.store.revoke_refresh_token(refresh_token).await? {
            info!(event = "user_logout", "Refresh token revoked");
        }
        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let user_id = self
            .tokens
            .verify(access_token, TokenKind::Access)
            .and_then(|claims| claims.user_id())
            .ok_or(AuthError::InvalidToken)?;

        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    async fn get_profile(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        name: Option<String>,
        designation: Option<String>,
    ) -> Result<User, AuthError> {
        self.store
            .update_user(
                user_id,
                UserChanges {
                    name,
                    designation,
                    ..UserChanges::default()
                },
            )
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let password_hash = self
            .store
            .get_user_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password_hash, current_password).await? {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;
        let revoked = self.store.revoke_user_refresh_tokens(user_id).await?;

        info!(
            event = "password_changed",
            user_id,
            sessions_revoked = revoked,
            "Password changed"
        );

        Ok(())
    }

    async fn setup_complete(&self) -> Result<bool, AuthError> {
        Ok(self.store.root_exists().await?)
    }

    async fn create_root_user(&self, input: RootUserInput) -> Result<User, AuthError> {
        if self.store.root_exists().await? {
            return Err(AuthError::Conflict(
                "a root user already exists".to_string(),
            ));
        }
        if self.store.username_exists(&input.username, None).await? {
            return Err(AuthError::Conflict(format!(
                "username '{}' is already taken",
                input.username
            )));
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    username: input.username,
                    password: input.password,
                    name: input.name,
                    designation: input.designation,
                    is_root: true,
                },
                &self.security,
            )
            .await?;

        info!(event = "root_user_created", user_id = user.id, "Root user created");
        Ok(user)
    }
}
