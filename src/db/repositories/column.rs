use anyhow::{Context, Result, bail};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::db::repositories::user::UserSummary;
use crate::entities::{columns, prelude::*, tasks, users};

/// Board column as presented to clients, with its current task count.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub id: i32,
    pub title: String,
    pub created_by: Option<i32>,
    pub creator: Option<UserSummary>,
    pub colors: Option<String>,
    pub position: i32,
    pub is_archived: bool,
    pub archived_at: Option<String>,
    pub task_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl BoardColumn {
    fn from_model(model: columns::Model, task_count: u64, creator: Option<UserSummary>) -> Self {
        Self {
            creator,
            is_archived: model.is_archived(),
            id: model.id,
            title: model.title,
            created_by: model.created_by,
            colors: model.colors,
            position: model.position,
            archived_at: model.deleted_at,
            task_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Outcome of taking a column off the open board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRemoval {
    Done,
    /// The column was already archived.
    Unchanged,
    NotFound,
    LastColumn,
    HasTasks,
}

pub struct ColumnRepository {
    conn: DatabaseConnection,
}

impl ColumnRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> Result<Option<columns::Model>> {
        Columns::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query column")
    }

    /// Raw column rows keyed by ID, archived ones included.
    pub async fn find_many(&self, ids: &[i32]) -> Result<HashMap<i32, columns::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Columns::find()
            .filter(columns::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query columns")?;

        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<BoardColumn>> {
        let Some(column) = self.find(id).await? else {
            return Ok(None);
        };

        let count = self.task_count(id).await?;
        let mut creators = self.creators(std::slice::from_ref(&column)).await?;
        let creator = column.created_by.and_then(|uid| creators.remove(&uid));
        Ok(Some(BoardColumn::from_model(column, count, creator)))
    }

    /// Columns in board order. Archived columns are skipped unless `show_archived`.
    pub async fn list(&self, show_archived: bool) -> Result<Vec<BoardColumn>> {
        let mut query = Columns::find()
            .order_by_asc(columns::Column::Position)
            .order_by_asc(columns::Column::Id);

        if !show_archived {
            query = query.filter(columns::Column::DeletedAt.is_null());
        }

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to list columns")?;

        let counts: HashMap<i32, i64> = Tasks::find()
            .select_only()
            .column(tasks::Column::ColumnId)
            .column_as(tasks::Column::Id.count(), "task_count")
            .group_by(tasks::Column::ColumnId)
            .into_tuple::<(i32, i64)>()
            .all(&self.conn)
            .await
            .context("Failed to count tasks per column")?
            .into_iter()
            .collect();

        let creators = self.creators(&rows).await?;

        Ok(rows
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                let creator = c.created_by.and_then(|uid| creators.get(&uid).cloned());
                BoardColumn::from_model(c, u64::try_from(count).unwrap_or(0), creator)
            })
            .collect())
    }

    async fn creators(&self, rows: &[columns::Model]) -> Result<HashMap<i32, UserSummary>> {
        let mut ids: Vec<i32> = rows.iter().filter_map(|c| c.created_by).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(Users::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.conn)
            .await
            .context("Failed to load column creators")?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect())
    }

    pub async fn title_exists(&self, title: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = Columns::find().filter(columns::Column::Title.eq(title));
        if let Some(id) = exclude_id {
            query = query.filter(columns::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check column title")?;

        Ok(count > 0)
    }

    pub async fn task_count(&self, id: i32) -> Result<u64> {
        tasks_in(&self.conn, id).await
    }

    /// Appends a new column after the current last one.
    pub async fn create(
        &self,
        title: &str,
        created_by: i32,
        colors: Option<String>,
    ) -> Result<columns::Model> {
        let txn = self.conn.begin().await?;

        let position = next_position(&txn).await?;
        let model = columns::ActiveModel {
            title: Set(title.to_string()),
            created_by: Set(Some(created_by)),
            colors: Set(colors),
            position: Set(position),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert column")?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn update(
        &self,
        id: i32,
        title: Option<String>,
        colors: Option<String>,
    ) -> Result<Option<columns::Model>> {
        let Some(column) = self.find(id).await? else {
            return Ok(None);
        };

        let mut active: columns::ActiveModel = column.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(colors) = colors {
            active.colors = Set(Some(colors).filter(|c| !c.is_empty()));
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update column")?;

        Ok(Some(updated))
    }

    /// Archives the column unless it is the last open one.
    ///
    /// The write runs before the count so concurrent removals queue on the
    /// SQLite write lock and each one sees what the previous one committed.
    pub async fn archive(&self, id: i32) -> Result<ColumnRemoval> {
        let txn = self.conn.begin().await?;

        let result = Columns::update_many()
            .col_expr(columns::Column::DeletedAt, Expr::current_timestamp().into())
            .filter(columns::Column::Id.eq(id))
            .filter(columns::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .context("Failed to archive column")?;

        if result.rows_affected == 0 {
            let exists = Columns::find_by_id(id)
                .one(&txn)
                .await
                .context("Failed to query column")?
                .is_some();
            txn.rollback().await?;
            return Ok(if exists {
                ColumnRemoval::Unchanged
            } else {
                ColumnRemoval::NotFound
            });
        }

        if open_columns(&txn).await? == 0 {
            txn.rollback().await?;
            return Ok(ColumnRemoval::LastColumn);
        }

        txn.commit().await?;
        Ok(ColumnRemoval::Done)
    }

    /// Clears the archive marker. Returns false if the column does not exist.
    pub async fn unarchive(&self, id: i32) -> Result<bool> {
        let result = Columns::update_many()
            .col_expr(
                columns::Column::DeletedAt,
                Expr::value(Option::<String>::None),
            )
            .filter(columns::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to restore column")?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes the column if it is neither the last open column nor holding tasks.
    pub async fn delete(&self, id: i32) -> Result<ColumnRemoval> {
        let txn = self.conn.begin().await?;

        // Claim the write lock before reading.
        let claimed = Columns::update_many()
            .col_expr(
                columns::Column::Position,
                Expr::col(columns::Column::Position).into(),
            )
            .filter(columns::Column::Id.eq(id))
            .exec(&txn)
            .await
            .context("Failed to lock column")?;

        let column = match claimed.rows_affected {
            0 => None,
            _ => Columns::find_by_id(id)
                .one(&txn)
                .await
                .context("Failed to query column")?,
        };
        let Some(column) = column else {
            txn.rollback().await?;
            return Ok(ColumnRemoval::NotFound);
        };

        if !column.is_archived() && open_columns(&txn).await? <= 1 {
            txn.rollback().await?;
            return Ok(ColumnRemoval::LastColumn);
        }
        if tasks_in(&txn, id).await? > 0 {
            txn.rollback().await?;
            return Ok(ColumnRemoval::HasTasks);
        }

        Columns::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete column")?;

        txn.commit().await?;
        Ok(ColumnRemoval::Done)
    }

    /// Applies every `(column_id, position)` pair or none of them.
    pub async fn reorder(&self, orders: &[(i32, i32)]) -> Result<()> {
        let txn = self.conn.begin().await?;

        for &(id, position) in orders {
            let result = Columns::update_many()
                .col_expr(columns::Column::Position, Expr::value(position))
                .filter(columns::Column::Id.eq(id))
                .exec(&txn)
                .await
                .context("Failed to update column position")?;

            if result.rows_affected == 0 {
                bail!("Column {id} vanished during reorder");
            }
        }

        txn.commit().await?;
        Ok(())
    }

    /// Moves every task of `from` behind the tail of `to`, keeping their relative order.
    /// Returns the number of tasks moved.
    pub async fn move_all_tasks(&self, from: i32, to: i32) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let max: Option<Option<i32>> = Tasks::find()
            .select_only()
            .column_as(tasks::Column::Position.max(), "max_position")
            .filter(tasks::Column::ColumnId.eq(to))
            .into_tuple()
            .one(&txn)
            .await
            .context("Failed to read destination tail position")?;
        let offset = max.flatten().unwrap_or(0);

        let result = Tasks::update_many()
            .col_expr(tasks::Column::ColumnId, Expr::value(to))
            .col_expr(
                tasks::Column::Position,
                Expr::col(tasks::Column::Position).add(offset),
            )
            .filter(tasks::Column::ColumnId.eq(from))
            .exec(&txn)
            .await
            .context("Failed to move tasks between columns")?;

        txn.commit().await?;
        Ok(result.rows_affected)
    }
}

async fn next_position<C: ConnectionTrait>(db: &C) -> Result<i32> {
    let max: Option<Option<i32>> = Columns::find()
        .select_only()
        .column_as(columns::Column::Position.max(), "max_position")
        .into_tuple()
        .one(db)
        .await
        .context("Failed to read last column position")?;

    Ok(max.flatten().unwrap_or(0) + 1)
}

async fn open_columns<C: ConnectionTrait>(db: &C) -> Result<u64> {
    Columns::find()
        .filter(columns::Column::DeletedAt.is_null())
        .count(db)
        .await
        .context("Failed to count columns")
}

async fn tasks_in<C: ConnectionTrait>(db: &C, column_id: i32) -> Result<u64> {
    Tasks::find()
        .filter(tasks::Column::ColumnId.eq(column_id))
        .count(db)
        .await
        .context("Failed to count tasks in column")
}
