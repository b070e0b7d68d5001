use sea_orm_migration::prelude::*;

mod m20250301_create_board_schema;
mod m20250302_add_updated_at_triggers;
pub mod m20250303_seed_app_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_create_board_schema::Migration),
            Box::new(m20250302_add_updated_at_triggers::Migration),
            Box::new(m20250303_seed_app_settings::Migration),
        ]
    }
}
