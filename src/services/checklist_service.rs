//! Domain service for task checklist items.

use crate::db::ChecklistItem;
use crate::domain::Actor;
use crate::services::BoardError;

#[async_trait::async_trait]
pub trait ChecklistService: Send + Sync {
    async fn list_for_task(&self, task_id: i32) -> Result<Vec<ChecklistItem>, BoardError>;

    async fn create(
        &self,
        actor: Actor,
        task_id: i32,
        title: &str,
    ) -> Result<ChecklistItem, BoardError>;

    /// Only the item's creator or a root user may rename it.
    async fn rename(&self, actor: Actor, id: i32, title: &str)
    -> Result<ChecklistItem, BoardError>;

    /// Completes the item as `actor`, or reopens it. Open to every user.
    async fn toggle(&self, actor: Actor, id: i32) -> Result<ChecklistItem, BoardError>;

    /// Only the item's creator or a root user may delete it.
    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError>;
}
