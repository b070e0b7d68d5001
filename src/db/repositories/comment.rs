use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::db::repositories::user::UserSummary;
use crate::entities::{comments, prelude::*, users};

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub content: String,
    pub task_id: i32,
    pub created_by: i32,
    pub author: Option<UserSummary>,
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of a write that only the row's author may perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedWrite<T> {
    Done(T),
    NotFound,
    NotOwner,
}

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> Result<Option<comments::Model>> {
        Comments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment")
    }

    pub async fn get(&self, id: i32) -> Result<Option<CommentView>> {
        let Some(comment) = self.find(id).await? else {
            return Ok(None);
        };

        Ok(self.with_authors(vec![comment]).await?.pop())
    }

    /// Comments on a task, oldest first.
    pub async fn list_for_task(&self, task_id: i32) -> Result<Vec<CommentView>> {
        let rows = Comments::find()
            .filter(comments::Column::TaskId.eq(task_id))
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list comments")?;

        self.with_authors(rows).await
    }

    pub async fn create(
        &self,
        task_id: i32,
        created_by: i32,
        content: &str,
    ) -> Result<comments::Model> {
        comments::ActiveModel {
            content: Set(content.to_string()),
            task_id: Set(task_id),
            created_by: Set(created_by),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert comment")
    }

    /// Rewrites the content if `actor_id` authored the comment.
    pub async fn update(
        &self,
        id: i32,
        actor_id: i32,
        content: &str,
    ) -> Result<OwnedWrite<comments::Model>> {
        let result = Comments::update_many()
            .col_expr(comments::Column::Content, Expr::value(content))
            .filter(comments::Column::Id.eq(id))
            .filter(comments::Column::CreatedBy.eq(actor_id))
            .exec(&self.conn)
            .await
            .context("Failed to update comment")?;

        if result.rows_affected == 0 {
            return self.miss_reason(id).await;
        }

        match self.find(id).await? {
            Some(comment) => Ok(OwnedWrite::Done(comment)),
            None => Ok(OwnedWrite::NotFound),
        }
    }

    /// Deletes the comment if `actor_id` authored it.
    pub async fn delete(&self, id: i32, actor_id: i32) -> Result<OwnedWrite<()>> {
        let result = Comments::delete_many()
            .filter(comments::Column::Id.eq(id))
            .filter(comments::Column::CreatedBy.eq(actor_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;

        if result.rows_affected == 0 {
            return self.miss_reason(id).await;
        }

        Ok(OwnedWrite::Done(()))
    }

    async fn miss_reason<T>(&self, id: i32) -> Result<OwnedWrite<T>> {
        Ok(if self.find(id).await?.is_some() {
            OwnedWrite::NotOwner
        } else {
            OwnedWrite::NotFound
        })
    }

    async fn with_authors(&self, rows: Vec<comments::Model>) -> Result<Vec<CommentView>> {
        let mut author_ids: Vec<i32> = rows.iter().map(|c| c.created_by).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i32, UserSummary> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            Users::find()
                .filter(users::Column::Id.is_in(author_ids))
                .all(&self.conn)
                .await
                .context("Failed to load comment authors")?
                .iter()
                .map(|u| (u.id, UserSummary::from(u)))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|c| CommentView {
                author: authors.get(&c.created_by).cloned(),
                id: c.id,
                content: c.content,
                task_id: c.task_id,
                created_by: c.created_by,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect())
    }
}
