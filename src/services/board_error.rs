//! Error taxonomy shared by the board services.
//!
//! Audit failures never appear here: the activity ledger swallows them.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl BoardError {
    pub fn not_found(resource: &str, id: i32) -> Self {
        Self::NotFound(format!("{resource} {id}"))
    }

    /// Maps a UNIQUE constraint failure to `Conflict(message)`. Anything else is a storage failure.
    pub fn unique_or_storage(err: anyhow::Error, message: impl FnOnce() -> String) -> Self {
        match err.downcast_ref::<DbErr>().and_then(DbErr::sql_err) {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(message()),
            _ => Self::from(err),
        }
    }
}

impl From<DbErr> for BoardError {
    fn from(err: DbErr) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}
