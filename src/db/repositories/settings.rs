use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Serialize;

use crate::db::migrator::m20250303_seed_app_settings::{
    DEFAULT_APP_DESCRIPTION, DEFAULT_APP_NAME,
};
use crate::domain::Theme;
use crate::entities::app_settings::{self, Entity as AppSettingsEntity};

const SETTINGS_ID: i32 = 1;

/// The application-wide settings value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSettings {
    pub app_name: String,
    pub app_description: Option<String>,
    pub default_theme: Theme,
    pub enable_notifications: bool,
    pub updated_at: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_description: Some(DEFAULT_APP_DESCRIPTION.to_string()),
            default_theme: Theme::System,
            enable_notifications: true,
            updated_at: None,
        }
    }
}

impl From<app_settings::Model> for AppSettings {
    fn from(model: app_settings::Model) -> Self {
        Self {
            default_theme: model.default_theme.parse().unwrap_or(Theme::System),
            app_name: model.app_name,
            app_description: model.app_description,
            enable_notifications: model.enable_notifications,
            updated_at: Some(model.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsChanges {
    pub app_name: Option<String>,
    pub app_description: Option<String>,
    pub default_theme: Option<Theme>,
    pub enable_notifications: Option<bool>,
}

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The stored settings, or the defaults if the singleton row is missing.
    pub async fn get(&self) -> Result<AppSettings> {
        let row = AppSettingsEntity::find_by_id(SETTINGS_ID)
            .one(&self.conn)
            .await
            .context("Failed to query app settings")?;

        Ok(row.map(AppSettings::from).unwrap_or_default())
    }

    pub async fn update(&self, changes: SettingsChanges) -> Result<AppSettings> {
        let existing = AppSettingsEntity::find_by_id(SETTINGS_ID)
            .one(&self.conn)
            .await
            .context("Failed to query app settings")?;

        let model = if let Some(row) = existing {
            let mut active: app_settings::ActiveModel = row.into();
            apply(&mut active, changes);
            active
                .update(&self.conn)
                .await
                .context("Failed to update app settings")?
        } else {
            let defaults = AppSettings::default();
            let mut active = app_settings::ActiveModel {
                id: Set(SETTINGS_ID),
                app_name: Set(defaults.app_name),
                app_description: Set(defaults.app_description),
                default_theme: Set(defaults.default_theme.as_str().to_string()),
                enable_notifications: Set(defaults.enable_notifications),
                ..Default::default()
            };
            apply(&mut active, changes);
            active
                .insert(&self.conn)
                .await
                .context("Failed to insert app settings")?
        };

        Ok(model.into())
    }
}

fn apply(active: &mut app_settings::ActiveModel, changes: SettingsChanges) {
    if let Some(name) = changes.app_name {
        active.app_name = Set(name);
    }
    if let Some(description) = changes.app_description {
        active.app_description = Set(Some(description).filter(|d| !d.is_empty()));
    }
    if let Some(theme) = changes.default_theme {
        active.default_theme = Set(theme.as_str().to_string());
    }
    if let Some(enabled) = changes.enable_notifications {
        active.enable_notifications = Set(enabled);
    }
}
