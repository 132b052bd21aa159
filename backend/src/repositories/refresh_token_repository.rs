//! Database repository for the refresh-token ledger.
//!
//! Rows are never deleted. Revocation flips `revoked` to true and nothing
//! ever flips it back, so repeated or concurrent revokes are harmless.
//! Every caller-facing lookup filters by owner before matching the token.

use crate::database::models::RefreshToken;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const TOKEN_COLUMNS: &str = "id, user_id, token, revoked, created_at, expires_at";

pub struct RefreshTokenRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> RefreshTokenRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a freshly issued refresh token as active.
    pub async fn create_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<RefreshToken> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            "INSERT INTO refresh_tokens (user_id, token, revoked, created_at, expires_at)
             VALUES (?, ?, 0, ?, ?)
             RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(user_id)
        .bind(token)
        .bind(Utc::now())
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(token)
    }

    /// Finds the active row matching both the token string and its owner.
    pub async fn find_active_token(&self, token: &str, user_id: i64) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens
             WHERE user_id = ? AND token = ? AND revoked = 0"
        ))
        .bind(user_id)
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(token)
    }

    /// Finds a row owned by `user_id` with this token string, revoked or not.
    pub async fn find_token_for_user(
        &self,
        token: &str,
        user_id: i64,
    ) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE user_id = ? AND token = ?"
        ))
        .bind(user_id)
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(token)
    }

    /// Finds a row by id, scoped to its owner.
    pub async fn find_token_by_id_for_user(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE user_id = ? AND id = ?"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(token)
    }

    /// Finds a row by token string across all users.
    pub async fn find_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(token)
    }

    pub async fn revoke_token(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Revokes every row owned by `user_id`; returns the number of rows touched.
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_tokens_for_user(&self, user_id: i64) -> Result<Vec<RefreshToken>> {
        let tokens = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(tokens)
    }

    pub async fn list_all_tokens(&self) -> Result<Vec<RefreshToken>> {
        let tokens = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(tokens)
    }
}
