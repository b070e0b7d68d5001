use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::db::repositories::user::UserSummary;
use crate::domain::{ActivityAction, EntityType};
use crate::entities::{activities, prelude::*, users};

/// An activity row about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub entity_type: EntityType,
    pub entity_id: i32,
    pub action: ActivityAction,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub user_id: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub action: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub user_id: i32,
    pub user: Option<UserSummary>,
    pub created_at: String,
}

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn append(&self, entry: &NewActivity) -> Result<activities::Model> {
        activities::ActiveModel {
            entity_type: Set(entry.entity_type.as_str().to_string()),
            entity_id: Set(entry.entity_id),
            action: Set(entry.action.as_str().to_string()),
            field_name: Set(entry.field_name.clone()),
            old_value: Set(entry.old_value.clone()),
            new_value: Set(entry.new_value.clone()),
            user_id: Set(entry.user_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert activity")
    }

    pub async fn get(&self, id: i32) -> Result<Option<ActivityEntry>> {
        let Some(row) = Activities::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query activity")?
        else {
            return Ok(None);
        };

        Ok(self.with_users(vec![row]).await?.pop())
    }

    /// History of one entity, newest first.
    pub async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: i32,
    ) -> Result<Vec<ActivityEntry>> {
        let rows = Activities::find()
            .filter(activities::Column::EntityType.eq(entity_type.as_str()))
            .filter(activities::Column::EntityId.eq(entity_id))
            .order_by_desc(activities::Column::CreatedAt)
            .order_by_desc(activities::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list entity activities")?;

        self.with_users(rows).await
    }

    /// Board-wide feed, newest first.
    pub async fn list_recent(&self, limit: u64, offset: u64) -> Result<Vec<ActivityEntry>> {
        let rows = Activities::find()
            .order_by_desc(activities::Column::CreatedAt)
            .order_by_desc(activities::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list recent activities")?;

        self.with_users(rows).await
    }

    pub async fn count(&self) -> Result<u64> {
        Activities::find()
            .count(&self.conn)
            .await
            .context("Failed to count activities")
    }

    pub async fn prune(&self, older_than_days: i64) -> Result<u64> {
        let result = Activities::delete_many()
            .filter(
                Expr::col(activities::Column::CreatedAt).lt(Func::cust("datetime")
                    .arg(Expr::val("now"))
                    .arg(Expr::val(format!("-{older_than_days} days")))),
            )
            .exec(&self.conn)
            .await
            .context("Failed to prune activities")?;

        Ok(result.rows_affected)
    }

    async fn with_users(&self, rows: Vec<activities::Model>) -> Result<Vec<ActivityEntry>> {
        let mut user_ids: Vec<i32> = rows.iter().map(|a| a.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let people: HashMap<i32, UserSummary> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            Users::find()
                .filter(users::Column::Id.is_in(user_ids))
                .all(&self.conn)
                .await
                .context("Failed to load activity users")?
                .iter()
                .map(|u| (u.id, UserSummary::from(u)))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|a| ActivityEntry {
                user: people.get(&a.user_id).cloned(),
                id: a.id,
                entity_type: a.entity_type,
                entity_id: a.entity_id,
                action: a.action,
                field_name: a.field_name,
                old_value: a.old_value,
                new_value: a.new_value,
                user_id: a.user_id,
                created_at: a.created_at,
            })
            .collect())
    }
}
