//! Application settings: a singleton value object.

use crate::db::{AppSettings, SettingsChanges};
use crate::services::BoardError;

#[async_trait::async_trait]
pub trait SettingsService: Send + Sync {
    async fn get(&self) -> Result<AppSettings, BoardError>;

    /// Applies the provided fields and returns the stored result.
    async fn update(&self, changes: SettingsChanges) -> Result<AppSettings, BoardError>;
}
