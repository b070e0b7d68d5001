use sea_orm::entity::prelude::*;

/// Append-only audit record. `entity_id` is deliberately not a foreign key:
/// rows outlive the entity they describe.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub entity_type: String,

    pub entity_id: i32,

    pub action: String,

    pub field_name: Option<String>,

    pub old_value: Option<String>,

    pub new_value: Option<String>,

    pub user_id: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
