//! `SeaORM` implementation of the `TaskService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{NewTask, Store, TaskChanges, TaskDetails, TaskFilter};
use crate::domain::{Actor, EntityType};
use crate::entities::columns;
use crate::services::activity_ledger::{ActivityLedger, diff_task};
use crate::services::task_service::{CreateTaskInput, TaskService};
use crate::services::BoardError;

pub struct SeaOrmTaskService {
    store: Store,
    ledger: ActivityLedger,
}

impl SeaOrmTaskService {
    #[must_use]
    pub const fn new(store: Store, ledger: ActivityLedger) -> Self {
        Self { store, ledger }
    }

    /// A column that exists and is not archived.
    async fn open_column(&self, id: i32) -> Result<columns::Model, BoardError> {
        match self.store.find_column(id).await? {
            Some(column) if !column.is_archived() => Ok(column),
            Some(_) => Err(BoardError::InvalidReference(format!(
                "column {id} is archived"
            ))),
            None => Err(BoardError::InvalidReference(format!(
                "column {id} does not exist"
            ))),
        }
    }

    async fn check_assignee(&self, user_id: i32) -> Result<(), BoardError> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(BoardError::InvalidReference(format!(
                "user {user_id} does not exist or is inactive"
            )));
        }
        Ok(())
    }

    async fn details(&self, id: i32) -> Result<TaskDetails, BoardError> {
        self.store
            .get_task_details(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Task", id))
    }

    async fn column_title(&self, id: i32) -> String {
        match self.store.find_column(id).await {
            Ok(Some(column)) => column.title,
            _ => format!("Column #{id}"),
        }
    }
}

#[async_trait]
impl TaskService for SeaOrmTaskService {
    async fn list(&self, filter: &TaskFilter) -> Result<(Vec<TaskDetails>, u64), BoardError> {
        Ok(self.store.list_tasks(filter).await?)
    }

    async fn get(&self, id: i32) -> Result<TaskDetails, BoardError> {
        self.details(id).await
    }

    async fn create(
        &self,
        actor: Actor,
        input: CreateTaskInput,
    ) -> Result<TaskDetails, BoardError> {
        self.open_column(input.column_id).await?;
        if let Some(assignee) = input.assigned_to {
            self.check_assignee(assignee).await?;
        }

        let task = self
            .store
            .create_task(NewTask {
                title: input.title,
                description: input.description,
                column_id: input.column_id,
                created_by: actor.id,
                assigned_to: input.assigned_to,
                due_date: input.due_date,
                priority: input.priority,
                weight: input.weight,
            })
            .await?;

        info!(
            event = "task_created",
            task_id = task.id,
            column_id = task.column_id,
            position = task.position,
            "Task created"
        );

        self.ledger
            .record_created(EntityType::Task, task.id, actor.id, &task.title)
            .await;

        self.details(task.id).await
    }

    async fn update(
        &self,
        actor: Actor,
        id: i32,
        changes: TaskChanges,
    ) -> Result<TaskDetails, BoardError> {
        let snapshot = self
            .store
            .find_task(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Task", id))?;

        if !actor.can_mutate(snapshot.created_by) {
            return Err(BoardError::Forbidden(
                "only the creator or a root user can modify this task".to_string(),
            ));
        }

        let target_column = changes
            .column_id
            .filter(|column_id| *column_id != snapshot.column_id);
        if let Some(column_id) = target_column {
            self.open_column(column_id).await?;
        }
        if let Some(Some(assignee)) = changes.assigned_to {
            self.check_assignee(assignee).await?;
        }

        let diff = diff_task(&snapshot, &changes);

        self.store
            .update_task(id, changes)
            .await?
            .ok_or_else(|| BoardError::not_found("Task", id))?;

        if let Some(column_id) = target_column {
            let from = self.column_title(snapshot.column_id).await;
            let to = self.column_title(column_id).await;
            self.ledger
                .record_moved(EntityType::Task, id, actor.id, "column", &from, &to)
                .await;
        }

        if !diff.is_empty() {
            let mut user_ids: Vec<i32> = diff.iter().flat_map(|c| c.user_ids()).collect();
            user_ids.sort_unstable();
            user_ids.dedup();
            // Names only decorate the audit text; fall back to IDs if the lookup fails.
            let people = self
                .store
                .user_summaries(&user_ids)
                .await
                .unwrap_or_default();
            self.ledger
                .record_task_changes(id, actor.id, &diff, &people)
                .await;
        }

        self.details(id).await
    }

    async fn move_task(
        &self,
        actor: Actor,
        id: i32,
        column_id: i32,
        position: i32,
    ) -> Result<TaskDetails, BoardError> {
        if position < 1 {
            return Err(BoardError::Validation(
                "position must be at least 1".to_string(),
            ));
        }

        let snapshot = self
            .store
            .find_task(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Task", id))?;
        let target = self.open_column(column_id).await?;

        let placed = self
            .store
            .move_task(id, column_id, position)
            .await?
            .ok_or_else(|| BoardError::not_found("Task", id))?;

        info!(
            event = "task_moved",
            task_id = id,
            from_column = snapshot.column_id,
            to_column = column_id,
            position = placed,
            "Task moved"
        );

        if snapshot.column_id != column_id {
            let from = self.column_title(snapshot.column_id).await;
            self.ledger
                .record_moved(EntityType::Task, id, actor.id, "column", &from, &target.title)
                .await;
        }

        self.details(id).await
    }

    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError> {
        let snapshot = self
            .store
            .find_task(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Task", id))?;

        if !actor.can_mutate(snapshot.created_by) {
            return Err(BoardError::Forbidden(
                "only the creator or a root user can delete this task".to_string(),
            ));
        }

        if !self.store.delete_task(id).await? {
            return Err(BoardError::not_found("Task", id));
        }

        info!(event = "task_deleted", task_id = id, "Task deleted");

        self.ledger
            .record_deleted(EntityType::Task, id, actor.id, &snapshot.title)
            .await;

        Ok(())
    }
}
