//! Administrative user management. Callers are expected to be root.

use crate::db::{NewUser, User, UserChanges, UserFilter};
use crate::domain::Actor;
use crate::services::auth_service::AuthError;

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self, filter: &UserFilter) -> Result<(Vec<User>, u64), AuthError>;

    /// Any user by ID, inactive ones included.
    async fn get(&self, id: i32) -> Result<User, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the username is taken.
    async fn create(&self, input: NewUser) -> Result<User, AuthError>;

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, AuthError>;

    /// Deactivates the user and revokes their sessions.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when an actor tries to archive themselves.
    async fn archive(&self, actor: Actor, id: i32) -> Result<(), AuthError>;

    async fn unarchive(&self, id: i32) -> Result<(), AuthError>;

    async fn set_password(&self, id: i32, password: &str) -> Result<(), AuthError>;

    /// Active users matching `query` by username or name.
    async fn search(&self, query: &str) -> Result<Vec<User>, AuthError>;
}
