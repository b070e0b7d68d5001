//! Domain service for task comments.
//!
//! Only the author may edit or delete a comment; root users get no bypass here.

use crate::db::CommentView;
use crate::domain::Actor;
use crate::services::BoardError;

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// Comments on a task, oldest first.
    async fn list_for_task(&self, task_id: i32) -> Result<Vec<CommentView>, BoardError>;

    async fn get(&self, id: i32) -> Result<CommentView, BoardError>;

    async fn create(
        &self,
        actor: Actor,
        task_id: i32,
        content: &str,
    ) -> Result<CommentView, BoardError>;

    /// # Errors
    ///
    /// Returns [`BoardError::Forbidden`] if the actor is not the author.
    async fn update(&self, actor: Actor, id: i32, content: &str)
    -> Result<CommentView, BoardError>;

    /// # Errors
    ///
    /// Returns [`BoardError::Forbidden`] if the actor is not the author.
    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError>;
}
