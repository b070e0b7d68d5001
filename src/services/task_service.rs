//! Domain service for tasks: creation, partial updates, moves and deletion.
//!
//! Every mutation records its activity after the write has committed.

use crate::db::{TaskChanges, TaskDetails, TaskFilter};
use crate::domain::{Actor, Priority};
use crate::services::BoardError;

#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub column_id: i32,
    pub assigned_to: Option<i32>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub weight: i32,
}

#[async_trait::async_trait]
pub trait TaskService: Send + Sync {
    /// Filtered, paginated listing. Returns the page and the total match count.
    async fn list(&self, filter: &TaskFilter) -> Result<(Vec<TaskDetails>, u64), BoardError>;

    async fn get(&self, id: i32) -> Result<TaskDetails, BoardError>;

    /// Appends a new task to the tail of its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidReference`] if the column is missing or
    /// archived, or the assignee is not an active user.
    async fn create(&self, actor: Actor, input: CreateTaskInput)
    -> Result<TaskDetails, BoardError>;

    /// Applies a partial update. A column change moves the task to the tail
    /// of the target column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Forbidden`] if the actor neither created the task
    /// nor is root.
    async fn update(
        &self,
        actor: Actor,
        id: i32,
        changes: TaskChanges,
    ) -> Result<TaskDetails, BoardError>;

    /// Places the task at `position` (1-based) in `column_id`.
    async fn move_task(
        &self,
        actor: Actor,
        id: i32,
        column_id: i32,
        position: i32,
    ) -> Result<TaskDetails, BoardError>;

    /// Deletes the task together with its comments and checklist.
    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError>;
}
