use crate::response::app_response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Token error: {0}")]
    TokenCreationError(String),
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Invalid reset token")]
    InvalidResetToken,
    #[error("Reset token has expired")]
    ExpiredResetToken,
    #[error("Admin privileges required")]
    AdminRequired,
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let status_code = match self {
            TokenError::InvalidToken => StatusCode::UNAUTHORIZED,
            TokenError::TokenExpired => StatusCode::UNAUTHORIZED,
            TokenError::MissingToken => StatusCode::UNAUTHORIZED,
            TokenError::TokenCreationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TokenError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            TokenError::InvalidResetToken => StatusCode::UNAUTHORIZED,
            TokenError::ExpiredResetToken => StatusCode::UNAUTHORIZED,
            TokenError::AdminRequired => StatusCode::FORBIDDEN,
        };

        ErrorResponse::send(self.to_string())
            .with_status(status_code)
            .into_response()
    }
}
