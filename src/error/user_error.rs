use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,
    #[error("An account with this email already exists")]
    DuplicateEmail,
    // One message for unknown email and wrong password; distinguishing
    // them would leak which emails are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status_code = match self {
            UserError::UserNotFound => StatusCode::NOT_FOUND,
            UserError::DuplicateEmail => StatusCode::CONFLICT,
            UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            UserError::IncorrectCurrentPassword => StatusCode::UNAUTHORIZED,
        };

        ErrorResponse::send(self.to_string())
            .with_status(status_code)
            .into_response()
    }
}
