//! `SeaORM` implementation of the `ColumnService` trait.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

use crate::db::{BoardColumn, ColumnRemoval, Store};
use crate::domain::{Actor, EntityType};
use crate::entities::columns;
use crate::services::activity_ledger::ActivityLedger;
use crate::services::column_service::{ColumnOrder, ColumnService};
use crate::services::BoardError;

pub struct SeaOrmColumnService {
    store: Store,
    ledger: ActivityLedger,
}

impl SeaOrmColumnService {
    #[must_use]
    pub const fn new(store: Store, ledger: ActivityLedger) -> Self {
        Self { store, ledger }
    }

    async fn column(&self, id: i32) -> Result<columns::Model, BoardError> {
        self.store
            .find_column(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Column", id))
    }

    async fn view(&self, id: i32) -> Result<BoardColumn, BoardError> {
        self.store
            .get_column(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Column", id))
    }

    async fn ensure_title_free(&self, title: &str, exclude_id: Option<i32>) -> Result<(), BoardError> {
        if self.store.column_title_exists(title, exclude_id).await? {
            return Err(BoardError::Conflict(duplicate_title(title)));
        }
        Ok(())
    }
}

fn duplicate_title(title: &str) -> String {
    format!("a column titled '{title}' already exists")
}

/// Maps a refused removal to the caller-facing error.
fn removal_result(outcome: ColumnRemoval, id: i32, verb: &str) -> Result<(), BoardError> {
    match outcome {
        ColumnRemoval::Done | ColumnRemoval::Unchanged => Ok(()),
        ColumnRemoval::NotFound => Err(BoardError::not_found("Column", id)),
        ColumnRemoval::LastColumn => Err(BoardError::Conflict(format!(
            "cannot {verb} the last column"
        ))),
        ColumnRemoval::HasTasks => Err(BoardError::Conflict(
            "cannot delete column with existing tasks".to_string(),
        )),
    }
}

#[async_trait]
impl ColumnService for SeaOrmColumnService {
    async fn list(&self, show_archived: bool) -> Result<Vec<BoardColumn>, BoardError> {
        Ok(self.store.list_columns(show_archived).await?)
    }

    async fn get(&self, id: i32) -> Result<BoardColumn, BoardError> {
        self.view(id).await
    }

    async fn create(
        &self,
        actor: Actor,
        title: &str,
        colors: Option<String>,
    ) -> Result<BoardColumn, BoardError> {
        self.ensure_title_free(title, None).await?;

        // The UNIQUE index settles races the check above cannot see.
        let column = self
            .store
            .create_column(title, actor.id, colors.filter(|c| !c.is_empty()))
            .await
            .map_err(|e| BoardError::unique_or_storage(e, || duplicate_title(title)))?;

        info!(
            event = "column_created",
            column_id = column.id,
            position = column.position,
            "Column created"
        );

        self.ledger
            .record_created(EntityType::Column, column.id, actor.id, &column.title)
            .await;

        self.view(column.id).await
    }

    async fn update(
        &self,
        actor: Actor,
        id: i32,
        title: Option<String>,
        colors: Option<String>,
    ) -> Result<BoardColumn, BoardError> {
        let current = self.column(id).await?;

        let new_title = title.filter(|t| *t != current.title);
        if let Some(title) = &new_title {
            self.ensure_title_free(title, Some(id)).await?;
        }

        self.store
            .update_column(id, new_title.clone(), colors)
            .await
            .map_err(|e| {
                BoardError::unique_or_storage(e, || {
                    duplicate_title(new_title.as_deref().unwrap_or_default())
                })
            })?
            .ok_or_else(|| BoardError::not_found("Column", id))?;

        if let Some(title) = new_title {
            self.ledger
                .record_updated(EntityType::Column, id, actor.id, "title", &current.title, &title)
                .await;
        }

        self.view(id).await
    }

    async fn archive(&self, actor: Actor, id: i32) -> Result<BoardColumn, BoardError> {
        let column = self.column(id).await?;
        if column.is_archived() {
            return self.view(id).await;
        }

        match self.store.archive_column(id).await? {
            ColumnRemoval::Unchanged => return self.view(id).await,
            outcome => removal_result(outcome, id, "archive")?,
        }

        info!(event = "column_archived", column_id = id, "Column archived");
        self.ledger
            .record_updated(EntityType::Column, id, actor.id, "archived", "false", "true")
            .await;

        self.view(id).await
    }

    async fn unarchive(&self, actor: Actor, id: i32) -> Result<BoardColumn, BoardError> {
        let column = self.column(id).await?;
        if !column.is_archived() {
            return self.view(id).await;
        }

        if !self.store.unarchive_column(id).await? {
            return Err(BoardError::not_found("Column", id));
        }

        info!(event = "column_unarchived", column_id = id, "Column restored");
        self.ledger
            .record_updated(EntityType::Column, id, actor.id, "archived", "true", "false")
            .await;

        self.view(id).await
    }

    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError> {
        let column = self.column(id).await?;

        let outcome = self.store.delete_column(id).await?;
        removal_result(outcome, id, "delete")?;

        info!(event = "column_deleted", column_id = id, "Column deleted");
        self.ledger
            .record_deleted(EntityType::Column, id, actor.id, &column.title)
            .await;

        Ok(())
    }

    async fn reorder(
        &self,
        actor: Actor,
        orders: &[ColumnOrder],
    ) -> Result<Vec<BoardColumn>, BoardError> {
        let mut seen = HashSet::with_capacity(orders.len());
        for order in orders {
            if !seen.insert(order.id) {
                return Err(BoardError::Validation(format!(
                    "column {} appears more than once",
                    order.id
                )));
            }
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let existing = self.store.find_columns(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !existing.contains_key(id)) {
            return Err(BoardError::not_found("Column", *missing));
        }

        let pairs: Vec<(i32, i32)> = orders.iter().map(|o| (o.id, o.position)).collect();
        self.store.reorder_columns(&pairs).await?;

        info!(
            event = "columns_reordered",
            count = pairs.len(),
            actor_id = actor.id,
            "Columns reordered"
        );

        Ok(self.store.list_columns(false).await?)
    }

    async fn move_all_tasks(&self, actor: Actor, from: i32, to: i32) -> Result<u64, BoardError> {
        if from == to {
            return Err(BoardError::Validation(
                "source and destination columns must differ".to_string(),
            ));
        }

        let source = self.store.find_column(from).await?.ok_or_else(|| {
            BoardError::InvalidReference(format!("column {from} does not exist"))
        })?;
        let destination = match self.store.find_column(to).await? {
            Some(column) if !column.is_archived() => column,
            Some(_) => {
                return Err(BoardError::InvalidReference(format!(
                    "column {to} is archived"
                )));
            }
            None => {
                return Err(BoardError::InvalidReference(format!(
                    "column {to} does not exist"
                )));
            }
        };

        let moved = self.store.move_all_tasks(from, to).await?;

        info!(
            event = "column_drained",
            from_column = from,
            to_column = to,
            moved,
            "Moved all tasks between columns"
        );

        if moved > 0 {
            self.ledger
                .record_moved(
                    EntityType::Column,
                    from,
                    actor.id,
                    "tasks",
                    &source.title,
                    &destination.title,
                )
                .await;
        }

        Ok(moved)
    }
}
