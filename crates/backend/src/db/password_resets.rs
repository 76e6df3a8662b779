//! Password reset tokens.
//!
//! The raw token only ever exists in the emailed link. Rows hold its
//! SHA-256 digest, expire after [`RESET_TOKEN_TTL_MINUTES`], and are spent
//! on first use.

use sqlx::PgPool;

use soko_core::UserId;

use super::RepositoryError;
use crate::passwords;

/// How long a reset link stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i32 = 60;

/// Repository for password reset tokens.
pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new password reset repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a token for the user and return it. Earlier unused tokens are
    /// revoked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn issue(&self, user_id: UserId) -> Result<String, RepositoryError> {
        let token = passwords::reset_token();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM shop.password_reset_tokens WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, NOW() + make_interval(mins => $3))
            ",
        )
        .bind(user_id)
        .bind(passwords::token_digest(&token))
        .bind(RESET_TOKEN_TTL_MINUTES)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "Password reset token issued");
        Ok(token)
    }

    /// Spend a token and store the new password hash in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token is unknown, expired,
    /// or already used.
    pub async fn consume(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, UserId>(
            r"
            UPDATE shop.password_reset_tokens
            SET used_at = NOW()
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            ",
        )
        .bind(passwords::token_digest(token))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query("UPDATE shop.profiles SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "Password reset");
        Ok(user_id)
    }
}
