use crate::entities::{app_settings, prelude::*};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

pub const DEFAULT_APP_NAME: &str = "Offline Kanban";
pub const DEFAULT_APP_DESCRIPTION: &str = "A powerful offline-first Kanban board application";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let insert = Query::insert()
            .into_table(AppSettings)
            .columns([
                app_settings::Column::Id,
                app_settings::Column::AppName,
                app_settings::Column::AppDescription,
                app_settings::Column::DefaultTheme,
                app_settings::Column::EnableNotifications,
            ])
            .values_panic([
                1.into(),
                DEFAULT_APP_NAME.into(),
                DEFAULT_APP_DESCRIPTION.into(),
                "system".into(),
                true.into(),
            ])
            .on_conflict(
                OnConflict::column(app_settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(AppSettings)
            .and_where(Expr::col(app_settings::Column::Id).eq(1))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
