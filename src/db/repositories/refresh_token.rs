use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::{prelude::*, refresh_tokens};

pub struct RefreshTokenRepository {
    conn: DatabaseConnection,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        token: &str,
        expires_at: &str,
    ) -> Result<refresh_tokens::Model> {
        refresh_tokens::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at.to_string()),
            is_revoked: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to store refresh token")
    }

    pub async fn find(&self, token: &str) -> Result<Option<refresh_tokens::Model>> {
        RefreshTokens::find()
            .filter(refresh_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query refresh token")
    }

    /// Marks the token revoked. Returns false if it was unknown or already revoked.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::IsRevoked, Expr::value(true))
            .filter(refresh_tokens::Column::Token.eq(token))
            .filter(refresh_tokens::Column::IsRevoked.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh token")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn revoke_all_for_user(&self, user_id: i32) -> Result<u64> {
        let result = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::IsRevoked, Expr::value(true))
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::IsRevoked.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to revoke user refresh tokens")?;

        Ok(result.rows_affected)
    }

    /// Removes tokens that are revoked or expired as of `now` (RFC 3339).
    pub async fn purge_stale(&self, now: &str) -> Result<u64> {
        let result = RefreshTokens::delete_many()
            .filter(
                Condition::any()
                    .add(refresh_tokens::Column::IsRevoked.eq(true))
                    .add(refresh_tokens::Column::ExpiresAt.lt(now)),
            )
            .exec(&self.conn)
            .await
            .context("Failed to purge refresh tokens")?;

        Ok(result.rows_affected)
    }
}
