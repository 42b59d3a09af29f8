use crate::config::database::{Database, DatabaseTrait};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of attempting to redeem a reset token.
pub enum ResetConsumeOutcome {
    /// Token was live; password updated and token marked used.
    Consumed { user_id: Uuid },
    /// No token row with this hash exists.
    Unknown,
    /// The row exists but is expired or already used.
    Spent,
}

#[derive(Clone)]
pub struct ResetTokenRepository {
    pub(crate) db_conn: Arc<Database>,
}

impl ResetTokenRepository {
    pub fn new(db_conn: &Arc<Database>) -> Self {
        Self {
            db_conn: Arc::clone(db_conn),
        }
    }
}

#[async_trait]
pub trait ResetTokenRepositoryTrait {
    async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error>;
    async fn consume_and_set_password(
        &self,
        token_hash: &str,
        new_password_hash: &str,
    ) -> Result<ResetConsumeOutcome, Error>;
}

#[async_trait]
impl ResetTokenRepositoryTrait for ResetTokenRepository {
    async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(self.db_conn.get_pool())
        .await?;
        Ok(())
    }

    async fn consume_and_set_password(
        &self,
        token_hash: &str,
        new_password_hash: &str,
    ) -> Result<ResetConsumeOutcome, Error> {
        let mut tx = self.db_conn.get_pool().begin().await?;

        // Single-use guarantee: the conditional update marks the token
        // used only while it is still live, so a token can win at most
        // once even under concurrent redemption attempts.
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE password_reset_tokens SET used_at = NOW() \
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW() \
             RETURNING user_id",
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM password_reset_tokens WHERE token_hash = $1)",
            )
            .bind(token_hash)
            .fetch_one(&mut *tx)
            .await?;
            tx.rollback().await?;
            return Ok(if exists {
                ResetConsumeOutcome::Spent
            } else {
                ResetConsumeOutcome::Unknown
            });
        };

        // Password change and token consumption commit together, and the
        // stored refresh token is revoked with them.
        sqlx::query(
            "UPDATE users SET password = $2, refresh_token_hash = NULL, \
             refresh_token_expires_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(new_password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ResetConsumeOutcome::Consumed { user_id })
    }
}
