//! `SeaORM` implementation of the `ActivityService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{ActivityEntry, Store};
use crate::domain::EntityType;
use crate::services::activity_service::ActivityService;
use crate::services::BoardError;

pub struct SeaOrmActivityService {
    store: Store,
}

impl SeaOrmActivityService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivityService for SeaOrmActivityService {
    async fn recent(&self, limit: u64, offset: u64) -> Result<Vec<ActivityEntry>, BoardError> {
        Ok(self.store.list_recent_activities(limit, offset).await?)
    }

    async fn for_task(&self, task_id: i32) -> Result<Vec<ActivityEntry>, BoardError> {
        Ok(self
            .store
            .list_entity_activities(EntityType::Task, task_id)
            .await?)
    }

    async fn get(&self, id: i32) -> Result<ActivityEntry, BoardError> {
        self.store
            .get_activity(id)
            .await?
            .ok_or_else(|| BoardError::not_found("Activity", id))
    }

    async fn prune(&self, days: u32) -> Result<u64, BoardError> {
        if days == 0 {
            return Err(BoardError::Validation(
                "retention must be at least one day".to_string(),
            ));
        }

        let removed = self.store.prune_activities(i64::from(days)).await?;
        info!(
            event = "activities_pruned",
            days,
            removed,
            "Pruned old activity entries"
        );
        Ok(removed)
    }
}
