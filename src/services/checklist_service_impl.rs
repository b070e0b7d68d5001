//! `SeaORM` implementation of the `ChecklistService` trait.

use async_trait::async_trait;

use crate::db::{ChecklistItem, Store};
use crate::domain::Actor;
use crate::entities::checklists;
use crate::services::checklist_service::ChecklistService;
use crate::services::BoardError;

pub struct SeaOrmChecklistService {
    store: Store,
}

impl SeaOrmChecklistService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_task(&self, task_id: i32) -> Result<(), BoardError> {
        if self.store.find_task(task_id).await?.is_none() {
            return Err(BoardError::not_found("Task", task_id));
        }
        Ok(())
    }

    /// Loads the item and checks the actor may change it.
    async fn owned_item(&self, actor: Actor, id: i32) -> Result<checklists::Model, BoardError> {
        let item = self
            .store
            .find_checklist_item(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Checklist item", id))?;

        if !actor.can_mutate(item.created_by) {
            return Err(BoardError::Forbidden(
                "only the creator or a root user can change this checklist item".to_string(),
            ));
        }

        Ok(item)
    }
}

#[async_trait]
impl ChecklistService for SeaOrmChecklistService {
    async fn list_for_task(&self, task_id: i32) -> Result<Vec<ChecklistItem>, BoardError> {
        self.ensure_task(task_id).await?;
        Ok(self.store.list_checklist(task_id).await?)
    }

    async fn create(
        &self,
        actor: Actor,
        task_id: i32,
        title: &str,
    ) -> Result<ChecklistItem, BoardError> {
        self.ensure_task(task_id).await?;
        Ok(self
            .store
            .create_checklist_item(task_id, actor.id, title)
            .await?)
    }

    async fn rename(
        &self,
        actor: Actor,
        id: i32,
        title: &str,
    ) -> Result<ChecklistItem, BoardError> {
        self.owned_item(actor, id).await?;
        self.store
            .rename_checklist_item(id, title)
            .await?
            .ok_or_else(|| BoardError::not_found("Checklist item", id))
    }

    async fn toggle(&self, actor: Actor, id: i32) -> Result<ChecklistItem, BoardError> {
        self.store
            .toggle_checklist_item(id, actor.id)
            .await?
            .ok_or_else(|| BoardError::not_found("Checklist item", id))
    }

    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError> {
        self.owned_item(actor, id).await?;
        if !self.store.delete_checklist_item(id).await? {
            return Err(BoardError::not_found("Checklist item", id));
        }
        Ok(())
    }
}
