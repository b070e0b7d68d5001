//! `SeaORM` implementation of the `SettingsService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{AppSettings, SettingsChanges, Store};
use crate::services::settings_service::SettingsService;
use crate::services::BoardError;

pub struct SeaOrmSettingsService {
    store: Store,
}

impl SeaOrmSettingsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsService for SeaOrmSettingsService {
    async fn get(&self) -> Result<AppSettings, BoardError> {
        Ok(self.store.get_settings().await?)
    }

    async fn update(&self, changes: SettingsChanges) -> Result<AppSettings, BoardError> {
        let settings = self.store.update_settings(changes).await?;
        info!(
            event = "settings_updated",
            app_name = %settings.app_name,
            theme = %settings.default_theme,
            "Application settings updated"
        );
        Ok(settings)
    }
}
