use crate::config::database::{Database, DatabaseTrait};
use crate::config::logging::secure_log;
use crate::entity::user::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use std::sync::Arc;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password, is_admin, created_at, updated_at, last_login_at, refresh_token_hash, refresh_token_expires_at";

#[derive(Clone)]
pub struct UserRepository {
    pub(crate) db_conn: Arc<Database>,
}

impl UserRepository {
    pub fn new(db_conn: &Arc<Database>) -> Self {
        Self {
            db_conn: Arc::clone(db_conn),
        }
    }
}

#[async_trait]
pub trait UserRepositoryTrait {
    async fn find(&self, id: Uuid) -> Result<User, Error>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
    async fn email_exists(&self, email: &str) -> Result<bool, Error>;
    async fn create(&self, id: Uuid, email: &str, password_hash: &str) -> Result<(), Error>;
    async fn touch_last_login(&self, id: Uuid) -> Result<(), Error>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), Error>;
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error>;
    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        old_token_hash: &str,
        new_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, Error>;
    async fn clear_refresh_token(&self, user_id: Uuid) -> Result<(), Error>;
    async fn find_by_refresh_token_hash(&self, refresh_token_hash: &str) -> Option<User>;
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find(&self, id: Uuid) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_one(self.db_conn.get_pool())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        match sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.db_conn.get_pool())
        .await
        {
            Ok(user) => user,
            Err(e) => {
                secure_log::secure_error!("User lookup by email failed", e);
                None
            }
        }
    }

    async fn email_exists(&self, email: &str) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(self.db_conn.get_pool())
            .await
    }

    async fn create(&self, id: Uuid, email: &str, password_hash: &str) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO users (id, email, password, is_admin) VALUES ($1, $2, $3, FALSE)",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .execute(self.db_conn.get_pool())
        .await?;
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.db_conn.get_pool())
            .await?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), Error> {
        // New password revokes the stored refresh token in the same
        // statement so existing sessions cannot be extended.
        sqlx::query(
            "UPDATE users SET password = $2, refresh_token_hash = NULL, \
             refresh_token_expires_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.db_conn.get_pool())
        .await?;
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, refresh_token_expires_at = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .execute(self.db_conn.get_pool())
        .await?;
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        old_token_hash: &str,
        new_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        // Conditional update keyed on the old hash: of two concurrent
        // refresh calls presenting the same token, exactly one matches.
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $3, refresh_token_expires_at = $4, \
             updated_at = NOW() WHERE id = $1 AND refresh_token_hash = $2",
        )
        .bind(user_id)
        .bind(old_token_hash)
        .bind(new_token_hash)
        .bind(expires_at)
        .execute(self.db_conn.get_pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_refresh_token(&self, user_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL, refresh_token_expires_at = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(self.db_conn.get_pool())
        .await?;
        Ok(())
    }

    async fn find_by_refresh_token_hash(&self, refresh_token_hash: &str) -> Option<User> {
        match sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE refresh_token_hash = $1 AND refresh_token_expires_at > NOW()",
            USER_COLUMNS
        ))
        .bind(refresh_token_hash)
        .fetch_optional(self.db_conn.get_pool())
        .await
        {
            Ok(user) => user,
            Err(e) => {
                secure_log::secure_error!("User lookup by refresh token hash failed", e);
                None
            }
        }
    }
}
