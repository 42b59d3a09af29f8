use crate::config::database::Database;
use crate::config::logging::secure_log;
use crate::dto::user_dto::UserRegisterDto;
use crate::entity::user::User;
use crate::error::api_error::ApiError;
use crate::error::db_error::DbError;
use crate::error::user_error::UserError;
use crate::repository::user_repository::{UserRepository, UserRepositoryTrait};
use crate::service::password_service::{PasswordService, PasswordServiceTrait};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct UserService<R: UserRepositoryTrait = UserRepository> {
    user_repo: R,
    password_service: PasswordService,
}

impl UserService {
    pub fn new(db_conn: &Arc<Database>) -> Self {
        Self {
            user_repo: UserRepository::new(db_conn),
            password_service: PasswordService::new(),
        }
    }
}

impl<R: UserRepositoryTrait> UserService<R> {
    /// Emails compare case-insensitively; normalization happens once,
    /// here, before any lookup or insert.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub async fn create_user(&self, payload: UserRegisterDto) -> Result<User, ApiError> {
        let email = Self::normalize_email(&payload.email);

        match self.user_repo.email_exists(&email).await {
            Ok(true) => return Err(UserError::DuplicateEmail)?,
            Ok(false) => {}
            Err(e) => {
                secure_log::secure_error!("Failed to check email existence", e);
                return Err(ApiError::Db(DbError::SomethingWentWrong(
                    "Failed to validate email".to_string(),
                )));
            }
        }

        let user_id = uuid::Uuid::now_v7();
        let hashed_password = self.password_service.hash_password(&payload.password)?;

        if let Err(e) = self.user_repo.create(user_id, &email, &hashed_password).await {
            // The unique index is the authority under concurrent
            // registration; the pre-check above only improves the error.
            if is_unique_violation(&e) {
                return Err(UserError::DuplicateEmail)?;
            }
            secure_log::secure_error!("Failed to insert user", e);
            return Err(ApiError::Db(DbError::SomethingWentWrong(
                "User creation failed".to_string(),
            )));
        }

        info!("SECURITY: User account created with ID: {}", user_id);

        self.user_repo.find(user_id).await.map_err(|e| {
            secure_log::secure_error!("Failed to find user after insertion", e);
            ApiError::Db(DbError::SomethingWentWrong("User creation failed".to_string()))
        })
    }

    pub async fn verify_password(&self, user: &User, password: &str) -> bool {
        let is_valid = self
            .password_service
            .verify_password(password, &user.password)
            .await;
        if is_valid {
            info!("SECURITY: Successful authentication for user ID: {}", user.id);
        } else {
            secure_log::secure_error!("SECURITY: Invalid password attempt for user ID: {}", user.id);
        }
        is_valid
    }

    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        if !self
            .password_service
            .verify_password(current_password, &user.password)
            .await
        {
            secure_log::secure_error!(
                "SECURITY: Password change with wrong current password for user ID: {}",
                user.id
            );
            return Err(UserError::IncorrectCurrentPassword)?;
        }

        let hashed = self.password_service.hash_password(new_password)?;

        self.user_repo
            .update_password(user.id, &hashed)
            .await
            .map_err(|e| {
                secure_log::secure_error!("Failed to update password", e);
                ApiError::Db(DbError::SomethingWentWrong("Password update failed".to_string()))
            })?;

        info!("SECURITY: Password changed for user ID: {}", user.id);
        Ok(())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
