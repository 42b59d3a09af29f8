use crate::entity::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct UserLoginDto {
    #[validate(email(message = "Email format is invalid"))]
    #[validate(length(max = 254, message = "Email must not exceed 254 characters"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct UserRegisterDto {
    #[validate(email(message = "Email format is invalid"))]
    #[validate(length(max = 254, message = "Email must not exceed 254 characters"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct PasswordChangeDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub new_password: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ResetRequestDto {
    #[validate(email(message = "Email format is invalid"))]
    #[validate(length(max = 254, message = "Email must not exceed 254 characters"))]
    pub email: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ResetSubmitDto {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub new_password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserReadDto {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserReadDto {
    pub fn from(model: User) -> UserReadDto {
        Self {
            id: model.id,
            email: model.email,
            is_admin: model.is_admin,
            created_at: model.created_at,
            last_login_at: model.last_login_at,
        }
    }
}

impl std::fmt::Debug for UserLoginDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User").field("email", &self.email).finish()
    }
}

impl std::fmt::Debug for UserRegisterDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User").field("email", &self.email).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload(password: &str, confirm: &str) -> UserRegisterDto {
        UserRegisterDto {
            email: "alice@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_register_accepts_matching_passwords() {
        assert!(register_payload("password123", "password123").validate().is_ok());
    }

    #[test]
    fn test_register_rejects_mismatched_confirmation() {
        let errors = register_payload("password123", "password124")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_register_rejects_short_password() {
        let errors = register_payload("short", "short").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let mut payload = register_payload("password123", "password123");
        payload.email = "not-an-email".to_string();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", register_payload("password123", "password123"));
        assert!(!rendered.contains("password123"));
    }
}
