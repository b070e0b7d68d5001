//! Domain service for board columns.
//!
//! Enforces the board-level invariants: titles are unique, at least one
//! non-archived column always remains, and a column must be drained before
//! it can be deleted.

use serde::Deserialize;

use crate::db::BoardColumn;
use crate::domain::Actor;
use crate::services::BoardError;

/// Target position for one column in a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColumnOrder {
    pub id: i32,
    pub position: i32,
}

#[async_trait::async_trait]
pub trait ColumnService: Send + Sync {
    /// Columns in board order, with task counts.
    async fn list(&self, show_archived: bool) -> Result<Vec<BoardColumn>, BoardError>;

    async fn get(&self, id: i32) -> Result<BoardColumn, BoardError>;

    /// Appends a column to the end of the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Conflict`] if the title is taken.
    async fn create(
        &self,
        actor: Actor,
        title: &str,
        colors: Option<String>,
    ) -> Result<BoardColumn, BoardError>;

    async fn update(
        &self,
        actor: Actor,
        id: i32,
        title: Option<String>,
        colors: Option<String>,
    ) -> Result<BoardColumn, BoardError>;

    /// Hides the column from the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Conflict`] if it is the last non-archived column.
    async fn archive(&self, actor: Actor, id: i32) -> Result<BoardColumn, BoardError>;

    async fn unarchive(&self, actor: Actor, id: i32) -> Result<BoardColumn, BoardError>;

    /// Deletes an empty column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Conflict`] if it is the last column or still holds tasks.
    async fn delete(&self, actor: Actor, id: i32) -> Result<(), BoardError>;

    /// Applies all positions atomically and returns the resulting board.
    async fn reorder(
        &self,
        actor: Actor,
        orders: &[ColumnOrder],
    ) -> Result<Vec<BoardColumn>, BoardError>;

    /// Moves every task of `from` behind the tail of `to`. Returns how many moved.
    async fn move_all_tasks(&self, actor: Actor, from: i32, to: i32) -> Result<u64, BoardError>;
}
