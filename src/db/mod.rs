use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::EntityType;
use crate::entities::{columns, comments, refresh_tokens, tasks};

pub mod migrator;
pub mod repositories;

pub use repositories::activity::{ActivityEntry, NewActivity};
pub use repositories::checklist::ChecklistItem;
pub use repositories::column::{BoardColumn, ColumnRemoval};
pub use repositories::comment::{CommentView, OwnedWrite};
pub use repositories::settings::{AppSettings, SettingsChanges};
pub use repositories::task::{
    NewTask, SortDirection, TaskChanges, TaskDetails, TaskFilter, TaskSortField,
};
pub use repositories::user::{NewUser, User, UserChanges, UserFilter, UserSummary};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` opens its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn column_repo(&self) -> repositories::column::ColumnRepository {
        repositories::column::ColumnRepository::new(self.conn.clone())
    }

    fn task_repo(&self) -> repositories::task::TaskRepository {
        repositories::task::TaskRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    fn checklist_repo(&self) -> repositories::checklist::ChecklistRepository {
        repositories::checklist::ChecklistRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn refresh_token_repo(&self) -> repositories::refresh_token::RefreshTokenRepository {
        repositories::refresh_token::RefreshTokenRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    // Columns

    pub async fn find_column(&self, id: i32) -> Result<Option<columns::Model>> {
        self.column_repo().find(id).await
    }

    pub async fn find_columns(&self, ids: &[i32]) -> Result<HashMap<i32, columns::Model>> {
        self.column_repo().find_many(ids).await
    }

    pub async fn get_column(&self, id: i32) -> Result<Option<BoardColumn>> {
        self.column_repo().get(id).await
    }

    pub async fn list_columns(&self, show_archived: bool) -> Result<Vec<BoardColumn>> {
        self.column_repo().list(show_archived).await
    }

    pub async fn column_title_exists(&self, title: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.column_repo().title_exists(title, exclude_id).await
    }

    pub async fn create_column(
        &self,
        title: &str,
        created_by: i32,
        colors: Option<String>,
    ) -> Result<columns::Model> {
        self.column_repo().create(title, created_by, colors).await
    }

    pub async fn update_column(
        &self,
        id: i32,
        title: Option<String>,
        colors: Option<String>,
    ) -> Result<Option<columns::Model>> {
        self.column_repo().update(id, title, colors).await
    }

    pub async fn archive_column(&self, id: i32) -> Result<ColumnRemoval> {
        self.column_repo().archive(id).await
    }

    pub async fn unarchive_column(&self, id: i32) -> Result<bool> {
        self.column_repo().unarchive(id).await
    }

    pub async fn delete_column(&self, id: i32) -> Result<ColumnRemoval> {
        self.column_repo().delete(id).await
    }

    pub async fn reorder_columns(&self, orders: &[(i32, i32)]) -> Result<()> {
        self.column_repo().reorder(orders).await
    }

    pub async fn move_all_tasks(&self, from: i32, to: i32) -> Result<u64> {
        self.column_repo().move_all_tasks(from, to).await
    }

    // Tasks

    pub async fn find_task(&self, id: i32) -> Result<Option<tasks::Model>> {
        self.task_repo().find(id).await
    }

    pub async fn get_task_details(&self, id: i32) -> Result<Option<TaskDetails>> {
        self.task_repo().get_details(id).await
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<(Vec<TaskDetails>, u64)> {
        self.task_repo().list(filter).await
    }

    pub async fn list_tasks_in_column(&self, column_id: i32) -> Result<Vec<tasks::Model>> {
        self.task_repo().list_in_column(column_id).await
    }

    pub async fn create_task(&self, task: NewTask) -> Result<tasks::Model> {
        self.task_repo().create(task).await
    }

    pub async fn update_task(&self, id: i32, changes: TaskChanges) -> Result<Option<tasks::Model>> {
        self.task_repo().update(id, changes).await
    }

    pub async fn move_task(
        &self,
        id: i32,
        column_id: i32,
        new_position: i32,
    ) -> Result<Option<i32>> {
        self.task_repo()
            .move_to_column(id, column_id, new_position)
            .await
    }

    pub async fn delete_task(&self, id: i32) -> Result<bool> {
        self.task_repo().delete(id).await
    }

    // Comments

    pub async fn find_comment(&self, id: i32) -> Result<Option<comments::Model>> {
        self.comment_repo().find(id).await
    }

    pub async fn get_comment(&self, id: i32) -> Result<Option<CommentView>> {
        self.comment_repo().get(id).await
    }

    pub async fn list_comments(&self, task_id: i32) -> Result<Vec<CommentView>> {
        self.comment_repo().list_for_task(task_id).await
    }

    pub async fn create_comment(
        &self,
        task_id: i32,
        created_by: i32,
        content: &str,
    ) -> Result<comments::Model> {
        self.comment_repo().create(task_id, created_by, content).await
    }

    pub async fn update_comment(
        &self,
        id: i32,
        actor_id: i32,
        content: &str,
    ) -> Result<OwnedWrite<comments::Model>> {
        self.comment_repo().update(id, actor_id, content).await
    }

    pub async fn delete_comment(&self, id: i32, actor_id: i32) -> Result<OwnedWrite<()>> {
        self.comment_repo().delete(id, actor_id).await
    }

    // Checklists

    pub async fn find_checklist_item(
        &self,
        id: i32,
    ) -> Result<Option<crate::entities::checklists::Model>> {
        self.checklist_repo().find(id).await
    }

    pub async fn list_checklist(&self, task_id: i32) -> Result<Vec<ChecklistItem>> {
        self.checklist_repo().list_for_task(task_id).await
    }

    pub async fn create_checklist_item(
        &self,
        task_id: i32,
        created_by: i32,
        title: &str,
    ) -> Result<ChecklistItem> {
        self.checklist_repo().create(task_id, created_by, title).await
    }

    pub async fn rename_checklist_item(
        &self,
        id: i32,
        title: &str,
    ) -> Result<Option<ChecklistItem>> {
        self.checklist_repo().rename(id, title).await
    }

    pub async fn toggle_checklist_item(
        &self,
        id: i32,
        actor_id: i32,
    ) -> Result<Option<ChecklistItem>> {
        self.checklist_repo().toggle(id, actor_id).await
    }

    pub async fn delete_checklist_item(&self, id: i32) -> Result<bool> {
        self.checklist_repo().delete(id).await
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_active(id).await
    }

    pub async fn get_user_any(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_any(id).await
    }

    pub async fn get_user_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_credentials(username).await
    }

    pub async fn get_user_password_hash(&self, id: i32) -> Result<Option<String>> {
        self.user_repo().get_password_hash(id).await
    }

    pub async fn create_user(&self, user: NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(user, security).await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        self.user_repo().update(id, changes).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<bool> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    pub async fn set_user_active(&self, id: i32, is_active: bool) -> Result<bool> {
        self.user_repo().set_active(id, is_active).await
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, u64)> {
        self.user_repo().list(filter).await
    }

    pub async fn search_users(&self, query: &str, limit: u64) -> Result<Vec<User>> {
        self.user_repo().search(query, limit).await
    }

    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.user_repo().username_exists(username, exclude_id).await
    }

    pub async fn root_exists(&self) -> Result<bool> {
        self.user_repo().root_exists().await
    }

    pub async fn user_summaries(&self, ids: &[i32]) -> Result<HashMap<i32, UserSummary>> {
        self.user_repo().summaries(ids).await
    }

    // Refresh tokens

    pub async fn store_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: &str,
    ) -> Result<refresh_tokens::Model> {
        self.refresh_token_repo()
            .create(user_id, token, expires_at)
            .await
    }

    pub async fn find_refresh_token(&self, token: &str) -> Result<Option<refresh_tokens::Model>> {
        self.refresh_token_repo().find(token).await
    }

    pub async fn revoke_refresh_token(&self, token: &str) -> Result<bool> {
        self.refresh_token_repo().revoke(token).await
    }

    pub async fn revoke_user_refresh_tokens(&self, user_id: i32) -> Result<u64> {
        self.refresh_token_repo().revoke_all_for_user(user_id).await
    }

    pub async fn purge_refresh_tokens(&self, now: &str) -> Result<u64> {
        self.refresh_token_repo().purge_stale(now).await
    }

    // Activities

    pub async fn append_activity(&self, entry: &NewActivity) -> Result<()> {
        self.activity_repo().append(entry).await?;
        Ok(())
    }

    pub async fn get_activity(&self, id: i32) -> Result<Option<ActivityEntry>> {
        self.activity_repo().get(id).await
    }

    pub async fn list_entity_activities(
        &self,
        entity_type: EntityType,
        entity_id: i32,
    ) -> Result<Vec<ActivityEntry>> {
        self.activity_repo()
            .list_for_entity(entity_type, entity_id)
            .await
    }

    pub async fn list_recent_activities(&self, limit: u64, offset: u64) -> Result<Vec<ActivityEntry>> {
        self.activity_repo().list_recent(limit, offset).await
    }

    pub async fn count_activities(&self) -> Result<u64> {
        self.activity_repo().count().await
    }

    pub async fn prune_activities(&self, older_than_days: i64) -> Result<u64> {
        self.activity_repo().prune(older_than_days).await
    }

    // Settings

    pub async fn get_settings(&self) -> Result<AppSettings> {
        self.settings_repo().get().await
    }

    pub async fn update_settings(&self, changes: SettingsChanges) -> Result<AppSettings> {
        self.settings_repo().update(changes).await
    }
}
