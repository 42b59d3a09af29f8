use crate::config::logging::secure_log;
use crate::dto::token_dto::MessageResponseDto;
use crate::dto::user_dto::{PasswordChangeDto, ResetRequestDto, ResetSubmitDto};
use crate::entity::user::User;
use crate::error::{api_error::ApiError, request_error::ValidatedRequest, token_error::TokenError};
use crate::repository::reset_token_repository::{ResetConsumeOutcome, ResetTokenRepositoryTrait};
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::cookie_service::CookieService;
use crate::service::password_service::PasswordServiceTrait;
use crate::service::user_service::UserService;
use crate::state::auth_state::AuthState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::AppendHeaders;
use axum::{Extension, Json};
use tracing::info;

type ClearedSessionResponse = (
    AppendHeaders<[(axum::http::HeaderName, String); 2]>,
    Json<MessageResponseDto>,
);

fn cleared(message: &str) -> ClearedSessionResponse {
    let [access_cookie, refresh_cookie] = CookieService::clear_cookies();
    (
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(MessageResponseDto {
            message: message.to_string(),
        }),
    )
}

/// Change the password of the authenticated user. Success revokes the
/// stored refresh token and clears the cookie pair; the client holds no
/// usable session afterwards and must log in again.
pub async fn change_password(
    State(state): State<AuthState>,
    Extension(current_user): Extension<User>,
    ValidatedRequest(payload): ValidatedRequest<PasswordChangeDto>,
) -> Result<ClearedSessionResponse, ApiError> {
    state
        .user_service
        .change_password(&current_user, &payload.current_password, &payload.new_password)
        .await?;

    Ok(cleared("Password changed, please log in again"))
}

/// Start a password reset. The response is identical whether or not the
/// email is registered; a reset token is persisted only when it is.
pub async fn request_reset(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<ResetRequestDto>,
) -> Json<MessageResponseDto> {
    let email = UserService::<crate::repository::user_repository::UserRepository>::normalize_email(&payload.email);

    if let Some(user) = state.user_repo.find_by_email(&email).await {
        let raw_token = state.password_service.generate_reset_token();
        let token_hash = state.password_service.hash_reset_token(&raw_token);
        let expires_at = state.password_service.reset_token_expiration();

        match state
            .reset_token_repo
            .create(user.id, &token_hash, expires_at)
            .await
        {
            Ok(()) => {
                info!("SECURITY: Password reset token created for user ID: {}", user.id);
                // Delivery is the mailer collaborator's job; only a
                // development build ever sees the raw token in logs.
                secure_log::sensitive_debug!("Reset token for {}: {}", email, raw_token);
            }
            Err(e) => {
                secure_log::secure_error!("Failed to persist reset token", e);
            }
        }
    }

    Json(MessageResponseDto {
        message: "If that email is registered, a reset link has been sent".to_string(),
    })
}

/// Complete a password reset with a previously issued token. The token
/// is single-use; consumption and the password update commit together.
pub async fn submit_reset(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<ResetSubmitDto>,
) -> Result<ClearedSessionResponse, ApiError> {
    let token_hash = state.password_service.hash_reset_token(&payload.token);
    let new_password_hash = state.password_service.hash_password(&payload.new_password)?;

    let outcome = state
        .reset_token_repo
        .consume_and_set_password(&token_hash, &new_password_hash)
        .await
        .map_err(|e| {
            secure_log::secure_error!("Reset token consumption failed", e);
            ApiError::Db(crate::error::db_error::DbError::SomethingWentWrong(e.to_string()))
        })?;

    match outcome {
        ResetConsumeOutcome::Consumed { user_id } => {
            info!("SECURITY: Password reset completed for user ID: {}", user_id);
            Ok(cleared("Password reset, please log in"))
        }
        ResetConsumeOutcome::Unknown => {
            secure_log::secure_error!("SECURITY: Reset attempted with unknown token");
            Err(TokenError::InvalidResetToken)?
        }
        ResetConsumeOutcome::Spent => {
            secure_log::secure_error!("SECURITY: Reset attempted with expired or used token");
            Err(TokenError::ExpiredResetToken)?
        }
    }
}
