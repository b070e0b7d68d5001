use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::repositories::user::UserSummary;
use crate::domain::Priority;
use crate::entities::{columns, comments, prelude::*, tasks, users};

/// Task enriched with the column title, people and comment count.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetails {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub column_id: i32,
    pub column_title: Option<String>,
    pub position: i32,
    pub weight: i32,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub assigned_to: Option<i32>,
    pub assignee: Option<UserSummary>,
    pub created_by: i32,
    pub creator: Option<UserSummary>,
    pub comment_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub column_id: i32,
    pub created_by: i32,
    pub assigned_to: Option<i32>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub weight: i32,
}

/// Partial task update. Outer `None` means "leave unchanged"; for the
/// nullable fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub column_id: Option<i32>,
    pub assigned_to: Option<Option<i32>>,
    pub due_date: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub weight: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortField {
    #[default]
    Position,
    CreatedAt,
    UpdatedAt,
    Title,
    DueDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub column_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub created_by: Option<i32>,
    pub priority: Option<Priority>,
    pub due_from: Option<String>,
    pub due_to: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    pub order_by: TaskSortField,
    pub order_dir: SortDirection,
    pub page: u64,
    pub limit: u64,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            search: None,
            column_id: None,
            assigned_to: None,
            created_by: None,
            priority: None,
            due_from: None,
            due_to: None,
            created_from: None,
            created_to: None,
            order_by: TaskSortField::Position,
            order_dir: SortDirection::Asc,
            page: 1,
            limit: 20,
        }
    }
}

pub struct TaskRepository {
    conn: DatabaseConnection,
}

impl TaskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> Result<Option<tasks::Model>> {
        Tasks::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query task")
    }

    pub async fn get_details(&self, id: i32) -> Result<Option<TaskDetails>> {
        let Some(task) = self.find(id).await? else {
            return Ok(None);
        };

        Ok(self.with_details(vec![task]).await?.pop())
    }

    /// Tasks of one column in board order.
    pub async fn list_in_column(&self, column_id: i32) -> Result<Vec<tasks::Model>> {
        Tasks::find()
            .filter(tasks::Column::ColumnId.eq(column_id))
            .order_by_asc(tasks::Column::Position)
            .order_by_asc(tasks::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list tasks in column")
    }

    /// Filtered, sorted and paginated task listing. Returns the page and the total match count.
    pub async fn list(&self, filter: &TaskFilter) -> Result<(Vec<TaskDetails>, u64)> {
        let mut query = Tasks::find();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(tasks::Column::Title.contains(search))
                    .add(tasks::Column::Description.contains(search)),
            );
        }
        if let Some(column_id) = filter.column_id {
            query = query.filter(tasks::Column::ColumnId.eq(column_id));
        }
        if let Some(assigned_to) = filter.assigned_to {
            query = query.filter(tasks::Column::AssignedTo.eq(assigned_to));
        }
        if let Some(created_by) = filter.created_by {
            query = query.filter(tasks::Column::CreatedBy.eq(created_by));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(tasks::Column::Priority.eq(priority.as_str()));
        }
        if let Some(from) = &filter.due_from {
            query = query.filter(tasks::Column::DueDate.gte(from.as_str()));
        }
        if let Some(to) = &filter.due_to {
            query = query.filter(tasks::Column::DueDate.lte(to.as_str()));
        }
        if let Some(from) = &filter.created_from {
            query = query.filter(tasks::Column::CreatedAt.gte(from.as_str()));
        }
        if let Some(to) = &filter.created_to {
            query = query.filter(tasks::Column::CreatedAt.lte(to.as_str()));
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count tasks")?;

        let order = match filter.order_dir {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let sort_column = match filter.order_by {
            TaskSortField::Position => tasks::Column::Position,
            TaskSortField::CreatedAt => tasks::Column::CreatedAt,
            TaskSortField::UpdatedAt => tasks::Column::UpdatedAt,
            TaskSortField::Title => tasks::Column::Title,
            TaskSortField::DueDate => tasks::Column::DueDate,
        };

        let limit = filter.limit.max(1);
        let offset = filter.page.saturating_sub(1) * limit;
        let rows = query
            .order_by(sort_column, order)
            .order_by_asc(tasks::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list tasks")?;

        Ok((self.with_details(rows).await?, total))
    }

    /// Inserts the task at the tail of its column.
    pub async fn create(&self, task: NewTask) -> Result<tasks::Model> {
        let txn = self.conn.begin().await?;

        let position = next_position(&txn, task.column_id).await?;
        let model = tasks::ActiveModel {
            title: Set(task.title),
            description: Set(task.description.filter(|d| !d.is_empty())),
            column_id: Set(task.column_id),
            assigned_to: Set(task.assigned_to),
            created_by: Set(task.created_by),
            due_date: Set(task.due_date),
            priority: Set(task.priority.map(|p| p.as_str().to_string())),
            position: Set(position),
            weight: Set(task.weight),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert task")?;

        txn.commit().await?;
        Ok(model)
    }

    /// Applies a partial update. A column change sends the task to the tail of
    /// the target column and closes its old slot, all in one transaction.
    pub async fn update(&self, id: i32, changes: TaskChanges) -> Result<Option<tasks::Model>> {
        let txn = self.conn.begin().await?;

        let Some(task) = Tasks::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query task for update")?
        else {
            return Ok(None);
        };

        let origin_column = task.column_id;
        let origin_position = task.position;
        let mut active: tasks::ActiveModel = task.into();

        if let Some(column_id) = changes.column_id.filter(|c| *c != origin_column) {
            close_slot(&txn, id, origin_column, origin_position).await?;
            let position = next_position(&txn, column_id).await?;
            active.column_id = Set(column_id);
            active.position = Set(position);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description).filter(|d| !d.is_empty()));
        }
        if let Some(assigned_to) = changes.assigned_to {
            active.assigned_to = Set(assigned_to);
        }
        if let Some(due_date) = changes.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(Some(priority.as_str().to_string()));
        }
        if let Some(weight) = changes.weight {
            active.weight = Set(weight);
        }

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update task")?;

        txn.commit().await?;
        Ok(Some(updated))
    }

    /// Places the task at `new_position` in `column_id`.
    ///
    /// The slot it leaves is closed and siblings at or after the target slot
    /// shift forward by one. Positions past the tail are clamped to the tail.
    /// Returns the final position, or `None` when the task does not exist.
    pub async fn move_to_column(
        &self,
        id: i32,
        column_id: i32,
        new_position: i32,
    ) -> Result<Option<i32>> {
        let txn = self.conn.begin().await?;

        let Some(task) = Tasks::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query task for move")?
        else {
            return Ok(None);
        };

        close_slot(&txn, id, task.column_id, task.position).await?;

        let siblings = Tasks::find()
            .filter(tasks::Column::ColumnId.eq(column_id))
            .filter(tasks::Column::Id.ne(id))
            .count(&txn)
            .await
            .context("Failed to count target column tasks")?;
        let tail = i32::try_from(siblings).unwrap_or(i32::MAX - 1) + 1;
        let position = new_position.clamp(1, tail);

        Tasks::update_many()
            .col_expr(
                tasks::Column::Position,
                Expr::col(tasks::Column::Position).add(1),
            )
            .filter(tasks::Column::ColumnId.eq(column_id))
            .filter(tasks::Column::Position.gte(position))
            .filter(tasks::Column::Id.ne(id))
            .exec(&txn)
            .await
            .context("Failed to shift target column tasks")?;

        Tasks::update_many()
            .col_expr(tasks::Column::ColumnId, Expr::value(column_id))
            .col_expr(tasks::Column::Position, Expr::value(position))
            .filter(tasks::Column::Id.eq(id))
            .exec(&txn)
            .await
            .context("Failed to place task")?;

        txn.commit().await?;
        Ok(Some(position))
    }

    /// Deletes the task and closes its slot. Comments and checklist items cascade.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(task) = Tasks::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query task for delete")?
        else {
            return Ok(false);
        };

        Tasks::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete task")?;
        close_slot(&txn, id, task.column_id, task.position).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn with_details(&self, rows: Vec<tasks::Model>) -> Result<Vec<TaskDetails>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<i32> = rows.iter().map(|t| t.id).collect();
        let mut column_ids: Vec<i32> = rows.iter().map(|t| t.column_id).collect();
        column_ids.sort_unstable();
        column_ids.dedup();
        let mut user_ids: Vec<i32> = rows
            .iter()
            .flat_map(|t| std::iter::once(t.created_by).chain(t.assigned_to))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let column_titles: HashMap<i32, String> = Columns::find()
            .filter(columns::Column::Id.is_in(column_ids))
            .all(&self.conn)
            .await
            .context("Failed to load task columns")?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();

        let people: HashMap<i32, UserSummary> = Users::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.conn)
            .await
            .context("Failed to load task users")?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        let comment_counts: HashMap<i32, i64> = Comments::find()
            .select_only()
            .column(comments::Column::TaskId)
            .column_as(comments::Column::Id.count(), "comment_count")
            .filter(comments::Column::TaskId.is_in(task_ids))
            .group_by(comments::Column::TaskId)
            .into_tuple::<(i32, i64)>()
            .all(&self.conn)
            .await
            .context("Failed to count task comments")?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|t| TaskDetails {
                column_title: column_titles.get(&t.column_id).cloned(),
                assignee: t.assigned_to.and_then(|id| people.get(&id).cloned()),
                creator: people.get(&t.created_by).cloned(),
                comment_count: comment_counts
                    .get(&t.id)
                    .and_then(|c| u64::try_from(*c).ok())
                    .unwrap_or(0),
                id: t.id,
                title: t.title,
                description: t.description,
                column_id: t.column_id,
                position: t.position,
                weight: t.weight,
                priority: t.priority,
                due_date: t.due_date,
                assigned_to: t.assigned_to,
                created_by: t.created_by,
                created_at: t.created_at,
                updated_at: t.updated_at,
            })
            .collect())
    }
}

async fn next_position<C: ConnectionTrait>(db: &C, column_id: i32) -> Result<i32> {
    let max: Option<Option<i32>> = Tasks::find()
        .select_only()
        .column_as(tasks::Column::Position.max(), "max_position")
        .filter(tasks::Column::ColumnId.eq(column_id))
        .into_tuple()
        .one(db)
        .await
        .context("Failed to read column tail position")?;

    Ok(max.flatten().unwrap_or(0) + 1)
}

/// Shifts every task after `position` in `column_id` down by one.
async fn close_slot<C: ConnectionTrait>(
    db: &C,
    task_id: i32,
    column_id: i32,
    position: i32,
) -> Result<()> {
    Tasks::update_many()
        .col_expr(
            tasks::Column::Position,
            Expr::col(tasks::Column::Position).sub(1),
        )
        .filter(tasks::Column::ColumnId.eq(column_id))
        .filter(tasks::Column::Position.gt(position))
        .filter(tasks::Column::Id.ne(task_id))
        .exec(db)
        .await
        .context("Failed to close task slot")?;

    Ok(())
}
