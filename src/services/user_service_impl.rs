//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User, UserChanges, UserFilter};
use crate::domain::Actor;
use crate::services::auth_service::AuthError;
use crate::services::user_service::UserService;

const SEARCH_LIMIT: u64 = 10;

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), AuthError> {
        if self.store.username_exists(username, exclude_id).await? {
            return Err(AuthError::Conflict(format!(
                "username '{username}' is already taken"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(&self, filter: &UserFilter) -> Result<(Vec<User>, u64), AuthError> {
        Ok(self.store.list_users(filter).await?)
    }

    async fn get(&self, id: i32) -> Result<User, AuthError> {
        self.store
            .get_user_any(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn create(&self, input: NewUser) -> Result<User, AuthError> {
        self.ensure_username_free(&input.username, None).await?;

        let user = self.store.create_user(input, &self.security).await?;
        info!(
            event = "user_created",
            user_id = user.id,
            is_root = user.is_root,
            "User created"
        );
        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, AuthError> {
        if let Some(username) = &changes.username {
            self.ensure_username_free(username, Some(id)).await?;
        }

        self.store
            .update_user(id, changes)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn archive(&self, actor: Actor, id: i32) -> Result<(), AuthError> {
        if actor.id == id {
            return Err(AuthError::Validation(
                "You cannot archive your own account".to_string(),
            ));
        }

        if !self.store.set_user_active(id, false).await? {
            return Err(AuthError::UserNotFound);
        }
        let revoked = self.store.revoke_user_refresh_tokens(id).await?;

        info!(
            event = "user_archived",
            user_id = id,
            sessions_revoked = revoked,
            "User archived"
        );
        Ok(())
    }

    async fn unarchive(&self, id: i32) -> Result<(), AuthError> {
        if !self.store.set_user_active(id, true).await? {
            return Err(AuthError::UserNotFound);
        }
        info!(event = "user_unarchived", user_id = id, "User restored");
        Ok(())
    }

    async fn set_password(&self, id: i32, password: &str) -> Result<(), AuthError> {
        if !self
            .store
            .update_user_password(id, password, &self.security)
            .await?
        {
            return Err(AuthError::UserNotFound);
        }
        self.store.revoke_user_refresh_tokens(id).await?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<User>, AuthError> {
        Ok(self.store.search_users(query, SEARCH_LIMIT).await?)
    }
}
