use crate::config::logging::secure_log;
use crate::dto::token_dto::{SessionResponseDto, SessionTokensDto};
use crate::dto::user_dto::{UserLoginDto, UserReadDto};
use crate::entity::user::User;
use crate::error::{api_error::ApiError, request_error::ValidatedRequest, user_error::UserError};
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::cookie_service::CookieService;
use crate::service::refresh_token_service::RefreshTokenServiceTrait;
use crate::service::user_service::UserService;
use crate::state::auth_state::AuthState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::AppendHeaders;
use axum::Json;
use tracing::info;

pub type SessionResponse = (
    AppendHeaders<[(axum::http::HeaderName, String); 2]>,
    Json<SessionResponseDto>,
);

/// Mint an access+refresh pair for a user, persist the refresh hash,
/// and build the matching cookie pair. Every path that starts a session
/// (login, register, refresh) goes through here.
pub async fn issue_session(
    state: &AuthState,
    user: &User,
    message: &str,
) -> Result<SessionResponse, ApiError> {
    let tokens: SessionTokensDto = state
        .refresh_token_service
        .mint_session(user, &state.token_service)?;

    let refresh_hash = state
        .refresh_token_service
        .hash_refresh_token(&tokens.refresh_token);
    let expires_at = state.refresh_token_service.calculate_expiration();

    state
        .user_repo
        .store_refresh_token(user.id, &refresh_hash, expires_at)
        .await
        .map_err(|e| {
            secure_log::secure_error!("Failed to store refresh token", e);
            ApiError::Db(crate::error::db_error::DbError::SomethingWentWrong(e.to_string()))
        })?;

    let [access_cookie, refresh_cookie] = CookieService::session_cookies(&tokens);

    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(SessionResponseDto {
            message: message.to_string(),
            user: UserReadDto::from(user.clone()),
            token: tokens.token,
            expires_at: tokens.exp,
        }),
    ))
}

pub async fn login(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<UserLoginDto>,
) -> Result<SessionResponse, ApiError> {
    let email = UserService::<crate::repository::user_repository::UserRepository>::normalize_email(&payload.email);
    info!("Login attempt for email: {}", email);

    // Unknown email and wrong password converge on the same error and,
    // via the service's verify-time floor, similar latency.
    let user = state.user_repo.find_by_email(&email).await.ok_or_else(|| {
        secure_log::secure_error!("SECURITY: Login for unknown email");
        UserError::InvalidCredentials
    })?;

    if !state.user_service.verify_password(&user, &payload.password).await {
        return Err(UserError::InvalidCredentials)?;
    }

    if let Err(e) = state.user_repo.touch_last_login(user.id).await {
        // Stale last-login is not worth failing an otherwise valid login.
        secure_log::secure_error!("Failed to update last login timestamp", e);
    }

    info!("SECURITY: Login successful for user ID: {}", user.id);
    issue_session(&state, &user, "Login successful").await
}

/// Identity echo for authenticated clients.
pub async fn me(axum::Extension(current_user): axum::Extension<User>) -> Json<UserReadDto> {
    secure_log::sensitive_debug!("Profile accessed for user ID: {}", current_user.id);
    Json(UserReadDto::from(current_user))
}
