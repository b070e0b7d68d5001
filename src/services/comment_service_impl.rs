//! `SeaORM` implementation of the `CommentService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{CommentView, OwnedWrite, Store};
use crate::domain::Actor;
use crate::services::activity_ledger::ActivityLedger;
use crate::services::comment_service::CommentService;
use crate::services::BoardError;

pub struct SeaOrmCommentService {
    store: Store,
    ledger: ActivityLedger,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store, ledger: ActivityLedger) -> Self {
        Self { store, ledger }
    }

    async fn ensure_task(&self, task_id: i32) -> Result<(), BoardError> {
        if self.store.find_task(task_id).await?.is_none() {
            return Err(BoardError::not_found("Task", task_id));
        }
        Ok(())
    }

    async fn view(&self, id: i32) -> Result<CommentView, BoardError> {
        self.store
            .get_comment(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Comment", id))
    }
}

fn not_author() -> BoardError {
    BoardError::Forbidden("only the author can change this comment".to_string())
}

#[async_trait]
impl CommentService for SeaOrmCommentService {
    async fn list_for_task(&self, task_id: i32) -> Result<Vec<CommentView>, BoardError> {
        self.ensure_task(task_id).await?;
        Ok(self.store.list_comments(task_id).await?)
    }

    async fn get(&self, id: i32) -> Result<CommentView, BoardError> {
        self.view(id).await
    }

    async fn create(
        &self,
        actor: Actor,
        task_id: i32,
        content: &str,
    ) -> Result<CommentView, BoardError> {
        self.ensure_task(task_id).await?;

        let comment = self
            .store
            .create_comment(task_id, actor.id, content)
            .await?;

        info!(
            event = "comment_created",
            comment_id = comment.id,
            task_id,
            "Comment added"
        );

        self.ledger.record_commented(task_id, actor.id).await;

        self.view(comment.id).await
    }

    async fn update(
        &self,
        actor: Actor,
        id: i32,
        content: &str,
    ) -> Result<CommentView, BoardError> {
        match self.store.update_comment(id, actor.id, content).await? {
            OwnedWrite::Done(_) => self.view(id).await,
            OwnedWrite::NotFound => Err(BoardError::not_found("Comment", id)),
            OwnedWrite::NotOwner => Err(not_author()),
        }
    }

    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError> {
        match self.store.delete_comment(id, actor.id).await? {
            OwnedWrite::Done(()) => {
                info!(event = "comment_deleted", comment_id = id, "Comment deleted");
                Ok(())
            }
            OwnedWrite::NotFound => Err(BoardError::not_found("Comment", id)),
            OwnedWrite::NotOwner => Err(not_author()),
        }
    }
}
