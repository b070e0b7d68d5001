//! Read side of the activity ledger, plus the retention sweep.

use crate::db::ActivityEntry;
use crate::services::BoardError;

#[async_trait::async_trait]
pub trait ActivityService: Send + Sync {
    /// Board-wide feed, newest first.
    async fn recent(&self, limit: u64, offset: u64) -> Result<Vec<ActivityEntry>, BoardError>;

    /// History of one task, newest first. Still available after the task is deleted.
    async fn for_task(&self, task_id: i32) -> Result<Vec<ActivityEntry>, BoardError>;

    async fn get(&self, id: i32) -> Result<ActivityEntry, BoardError>;

    /// Deletes entries older than `days` days and returns how many were removed.
    async fn prune(&self, days: u32) -> Result<u64, BoardError>;
}
