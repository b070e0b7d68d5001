use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

use crate::entities::{checklists, prelude::*};

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItem {
    pub id: i32,
    pub title: String,
    pub task_id: i32,
    pub created_by: i32,
    pub completed_by: Option<i32>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<checklists::Model> for ChecklistItem {
    fn from(model: checklists::Model) -> Self {
        Self {
            is_completed: model.completed_by.is_some(),
            id: model.id,
            title: model.title,
            task_id: model.task_id,
            created_by: model.created_by,
            completed_by: model.completed_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct ChecklistRepository {
    conn: DatabaseConnection,
}

impl ChecklistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> Result<Option<checklists::Model>> {
        Checklists::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query checklist item")
    }

    pub async fn list_for_task(&self, task_id: i32) -> Result<Vec<ChecklistItem>> {
        let rows = Checklists::find()
            .filter(checklists::Column::TaskId.eq(task_id))
            .order_by_asc(checklists::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list checklist items")?;

        Ok(rows.into_iter().map(ChecklistItem::from).collect())
    }

    pub async fn create(&self, task_id: i32, created_by: i32, title: &str) -> Result<ChecklistItem> {
        let model = checklists::ActiveModel {
            title: Set(title.to_string()),
            task_id: Set(task_id),
            created_by: Set(created_by),
            completed_by: Set(None),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert checklist item")?;

        Ok(model.into())
    }

    pub async fn rename(&self, id: i32, title: &str) -> Result<Option<ChecklistItem>> {
        let Some(item) = self.find(id).await? else {
            return Ok(None);
        };

        let mut active: checklists::ActiveModel = item.into();
        active.title = Set(title.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to rename checklist item")?;

        Ok(Some(updated.into()))
    }

    /// Marks the item completed by `actor_id`, or reopens it if already completed.
    pub async fn toggle(&self, id: i32, actor_id: i32) -> Result<Option<ChecklistItem>> {
        let Some(item) = self.find(id).await? else {
            return Ok(None);
        };

        let completed_by = if item.completed_by.is_some() {
            None
        } else {
            Some(actor_id)
        };

        let mut active: checklists::ActiveModel = item.into();
        active.completed_by = Set(completed_by);
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to toggle checklist item")?;

        Ok(Some(updated.into()))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Checklists::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete checklist item")?;

        Ok(result.rows_affected > 0)
    }
}
