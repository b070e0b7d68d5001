use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const TABLES: &[&str] = &[
    "users",
    "columns",
    "tasks",
    "comments",
    "checklists",
    "activities",
    "refresh_tokens",
    "app_settings",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Recursive triggers are off by default in SQLite, so the inner UPDATE
        // does not re-fire the trigger.
        for table in TABLES {
            conn.execute_unprepared(&format!(
                r"
                CREATE TRIGGER IF NOT EXISTS update_{table}_updated_at
                AFTER UPDATE ON {table}
                FOR EACH ROW
                BEGIN
                    UPDATE {table} SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
                END;
                "
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for table in TABLES {
            conn.execute_unprepared(&format!("DROP TRIGGER IF EXISTS update_{table}_updated_at"))
                .await?;
        }

        Ok(())
    }
}
