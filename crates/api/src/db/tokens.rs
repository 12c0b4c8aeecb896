//! Invalidated-token repository (the JWT denylist).
//!
//! Logout and refresh insert the presented token here; the auth extractor
//! rejects any denylisted token. Rows become dead weight once the token's
//! own expiry passes, so a periodic `purge_expired` keeps the table small.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for the token denylist.
pub struct InvalidatedTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvalidatedTokenRepository<'a> {
    /// Create a new invalidated-token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a token as invalidated until its natural expiry.
    ///
    /// Re-invalidating the same token (e.g. double logout) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO invalidated_tokens (token, expires_at) \
             VALUES ($1, $2) \
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Whether a token has been invalidated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(&self, token: &str) -> Result<bool, RepositoryError> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM invalidated_tokens WHERE token = $1)")
                .bind(token)
                .fetch_one(self.pool)
                .await?;

        Ok(row.0)
    }

    /// Drop denylist rows whose tokens have expired on their own.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM invalidated_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
