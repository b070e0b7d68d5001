use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use std::collections::HashMap;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub is_root: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            designation: model.designation,
            is_root: model.is_root,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Compact author/assignee reference embedded in task, comment and activity views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
}

impl UserSummary {
    /// The name when set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

impl From<&users::Model> for UserSummary {
    fn from(model: &users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            name: model.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub is_root: bool,
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub is_root: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct UserFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub is_root: Option<bool>,
    pub page: u64,
    pub limit: u64,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            search: None,
            is_active: None,
            is_root: None,
            page: 1,
            limit: 20,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active user by ID
    pub async fn get_active(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .filter(users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// User by ID regardless of the active flag
    pub async fn get_any(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Active user by username, together with the stored password hash
    pub async fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// Password hash for an active user by ID
    pub async fn get_password_hash(&self, id: i32) -> Result<Option<String>> {
        let user = Users::find_by_id(id)
            .filter(users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        Ok(user.map(|u| u.password_hash))
    }

    pub async fn create(&self, new_user: NewUser, security: &SecurityConfig) -> Result<User> {
        let password = new_user.password;
        let config = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let model = users::ActiveModel {
            username: Set(new_user.username),
            password_hash: Set(password_hash),
            name: Set(new_user.name),
            designation: Set(new_user.designation),
            is_root: Set(new_user.is_root),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        // Blank clears the field.
        if let Some(name) = changes.name {
            active.name = Set(Some(name).filter(|n| !n.is_empty()));
        }
        if let Some(designation) = changes.designation {
            active.designation = Set(Some(designation).filter(|d| !d.is_empty()));
        }
        if let Some(is_root) = changes.is_root {
            active.is_root = Set(is_root);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(User::from(updated)))
    }

    /// Hashes and stores a new password. Returns false when the user does not exist.
    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
        else {
            return Ok(false);
        };

        let password = new_password.to_string();
        let config = security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                users::Column::IsActive,
                sea_orm::sea_query::Expr::value(is_active),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to change user status")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<(Vec<User>, u64)> {
        let mut query = Users::find().order_by_asc(users::Column::Id);

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Username.contains(search))
                    .add(users::Column::Name.contains(search))
                    .add(users::Column::Designation.contains(search)),
            );
        }

        if let Some(is_active) = filter.is_active {
            query = query.filter(users::Column::IsActive.eq(is_active));
        }

        if let Some(is_root) = filter.is_root {
            query = query.filter(users::Column::IsRoot.eq(is_root));
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count users")?;

        let limit = filter.limit.max(1);
        let offset = filter.page.saturating_sub(1) * limit;
        let users = query
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok((users.into_iter().map(User::from).collect(), total))
    }

    /// Active users whose username or name contains `query`
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<User>> {
        let users = Users::find()
            .filter(users::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(users::Column::Username.contains(query))
                    .add(users::Column::Name.contains(query)),
            )
            .order_by_asc(users::Column::Username)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to search users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check username")?;

        Ok(count > 0)
    }

    pub async fn root_exists(&self) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::IsRoot.eq(true))
            .filter(users::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count root users")?;

        Ok(count > 0)
    }

    /// Summaries for the given IDs, inactive users included so history stays readable.
    pub async fn summaries(&self, ids: &[i32]) -> Result<HashMap<i32, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = Users::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to load user summaries")?;

        Ok(users
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect())
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC hash.
/// Runs on the blocking pool since Argon2 is CPU-intensive.
pub async fn verify_password(password_hash: String, password: &str) -> Result<bool> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("hunter22", Some(&light_config())).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(hash.clone(), "hunter22").await.unwrap());
        assert!(!verify_password(hash, "hunter23").await.unwrap());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut summary = UserSummary {
            id: 1,
            username: "jdoe".to_string(),
            name: None,
        };
        assert_eq!(summary.display_name(), "jdoe");

        summary.name = Some("  ".to_string());
        assert_eq!(summary.display_name(), "jdoe");

        summary.name = Some("Jane Doe".to_string());
        assert_eq!(summary.display_name(), "Jane Doe");
    }
}
