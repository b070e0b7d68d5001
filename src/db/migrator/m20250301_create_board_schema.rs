use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .date_time()
        .not_null()
        .extra("DEFAULT CURRENT_TIMESTAMP".to_owned())
        .to_owned()
}

fn id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id(Users::Id))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().null())
                    .col(ColumnDef::new(Users::Designation).string().null())
                    .col(
                        ColumnDef::new(Users::IsRoot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Columns::Table)
                    .if_not_exists()
                    .col(id(Columns::Id))
                    .col(
                        ColumnDef::new(Columns::Title)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Columns::CreatedBy).integer().null())
                    .col(ColumnDef::new(Columns::Colors).string().null())
                    .col(
                        ColumnDef::new(Columns::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Columns::DeletedAt).date_time().null())
                    .col(timestamp(Columns::CreatedAt))
                    .col(timestamp(Columns::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_columns_created_by")
                            .from(Columns::Table, Columns::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(id(Tasks::Id))
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text().null())
                    .col(ColumnDef::new(Tasks::ColumnId).integer().not_null())
                    .col(ColumnDef::new(Tasks::AssignedTo).integer().null())
                    .col(ColumnDef::new(Tasks::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(Tasks::DueDate).string().null())
                    .col(ColumnDef::new(Tasks::Priority).string().null())
                    .col(
                        ColumnDef::new(Tasks::Position)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Tasks::Weight)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Tasks::CreatedAt))
                    .col(timestamp(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_column")
                            .from(Tasks::Table, Tasks::ColumnId)
                            .to(Columns::Table, Columns::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_assigned_to")
                            .from(Tasks::Table, Tasks::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_created_by")
                            .from(Tasks::Table, Tasks::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_column_position")
                    .table(Tasks::Table)
                    .col(Tasks::ColumnId)
                    .col(Tasks::Position)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(id(Comments::Id))
                    .col(ColumnDef::new(Comments::Content).text().not_null())
                    .col(ColumnDef::new(Comments::TaskId).integer().not_null())
                    .col(ColumnDef::new(Comments::CreatedBy).integer().not_null())
                    .col(timestamp(Comments::CreatedAt))
                    .col(timestamp(Comments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_task")
                            .from(Comments::Table, Comments::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_created_by")
                            .from(Comments::Table, Comments::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Checklists::Table)
                    .if_not_exists()
                    .col(id(Checklists::Id))
                    .col(ColumnDef::new(Checklists::Title).string().not_null())
                    .col(ColumnDef::new(Checklists::TaskId).integer().not_null())
                    .col(ColumnDef::new(Checklists::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(Checklists::CompletedBy).integer().null())
                    .col(timestamp(Checklists::CreatedAt))
                    .col(timestamp(Checklists::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklists_task")
                            .from(Checklists::Table, Checklists::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklists_completed_by")
                            .from(Checklists::Table, Checklists::CompletedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(id(Activities::Id))
                    .col(ColumnDef::new(Activities::EntityType).string().not_null())
                    .col(ColumnDef::new(Activities::EntityId).integer().not_null())
                    .col(ColumnDef::new(Activities::Action).string().not_null())
                    .col(ColumnDef::new(Activities::FieldName).string().null())
                    .col(ColumnDef::new(Activities::OldValue).text().null())
                    .col(ColumnDef::new(Activities::NewValue).text().null())
                    .col(ColumnDef::new(Activities::UserId).integer().not_null())
                    .col(timestamp(Activities::CreatedAt))
                    .col(timestamp(Activities::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_entity")
                    .table(Activities::Table)
                    .col(Activities::EntityType)
                    .col(Activities::EntityId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_created_at")
                    .table(Activities::Table)
                    .col(Activities::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RefreshTokens::Table)
                    .if_not_exists()
                    .col(id(RefreshTokens::Id))
                    .col(
                        ColumnDef::new(RefreshTokens::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RefreshTokens::UserId).integer().not_null())
                    .col(ColumnDef::new(RefreshTokens::ExpiresAt).string().not_null())
                    .col(
                        ColumnDef::new(RefreshTokens::IsRevoked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(RefreshTokens::CreatedAt))
                    .col(timestamp(RefreshTokens::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_refresh_tokens_user")
                            .from(RefreshTokens::Table, RefreshTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppSettings::AppName).string().not_null())
                    .col(ColumnDef::new(AppSettings::AppDescription).string().null())
                    .col(
                        ColumnDef::new(AppSettings::DefaultTheme)
                            .string()
                            .not_null()
                            .default("system"),
                    )
                    .col(
                        ColumnDef::new(AppSettings::EnableNotifications)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(AppSettings::CreatedAt))
                    .col(timestamp(AppSettings::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Checklists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Columns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Name,
    Designation,
    IsRoot,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Columns {
    Table,
    Id,
    Title,
    CreatedBy,
    Colors,
    Position,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    ColumnId,
    AssignedTo,
    CreatedBy,
    DueDate,
    Priority,
    Position,
    Weight,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    Content,
    TaskId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Checklists {
    Table,
    Id,
    Title,
    TaskId,
    CreatedBy,
    CompletedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Activities {
    Table,
    Id,
    EntityType,
    EntityId,
    Action,
    FieldName,
    OldValue,
    NewValue,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RefreshTokens {
    Table,
    Id,
    Token,
    UserId,
    ExpiresAt,
    IsRevoked,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AppSettings {
    Table,
    Id,
    AppName,
    AppDescription,
    DefaultTheme,
    EnableNotifications,
    CreatedAt,
    UpdatedAt,
}
