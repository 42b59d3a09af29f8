use crate::entity::user::User;
use crate::repository::user_repository::UserRepositoryTrait;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::Error;
use std::borrow::Cow;
use std::sync::Mutex;
use uuid::Uuid;

/// Unique-constraint failure shaped like the one the Postgres driver
/// reports, so error mapping can be exercised without a database.
#[derive(Debug)]
pub(crate) struct UniqueViolation;

impl std::fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("duplicate key value violates unique constraint")
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }
}

/// In-memory user store mirroring the semantics the SQL queries rely
/// on: unique emails, and a single refresh slot per user that is only
/// swapped when the presented hash still matches.
pub(crate) struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub(crate) fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_user(user: User) -> Self {
        Self {
            users: Mutex::new(vec![user]),
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryUserRepository {
    async fn find(&self, id: Uuid) -> Result<User, Error> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(Error::RowNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, Error> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn create(&self, id: Uuid, email: &str, password_hash: &str) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(Error::Database(Box::new(UniqueViolation)));
        }
        let now = Utc::now();
        users.push(User {
            id,
            email: email.to_string(),
            password: password_hash.to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
        });
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), Error> {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), Error> {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.password = password_hash.to_string();
            user.refresh_token_hash = None;
            user.refresh_token_expires_at = None;
        }
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user_id)
        {
            user.refresh_token_hash = Some(refresh_token_hash.to_string());
            user.refresh_token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        old_token_hash: &str,
        new_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.id == user_id && u.refresh_token_hash.as_deref() == Some(old_token_hash))
        {
            Some(user) => {
                user.refresh_token_hash = Some(new_token_hash.to_string());
                user.refresh_token_expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, user_id: Uuid) -> Result<(), Error> {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user_id)
        {
            user.refresh_token_hash = None;
            user.refresh_token_expires_at = None;
        }
        Ok(())
    }

    async fn find_by_refresh_token_hash(&self, refresh_token_hash: &str) -> Option<User> {
        let now = Utc::now();
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                u.refresh_token_hash.as_deref() == Some(refresh_token_hash)
                    && u.refresh_token_expires_at.is_some_and(|exp| exp > now)
            })
            .cloned()
    }
}
