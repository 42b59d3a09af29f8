use crate::config::logging::secure_log;
use crate::dto::token_dto::MessageResponseDto;
use crate::entity::user::User;
use crate::error::{api_error::ApiError, token_error::TokenError};
use crate::handler::auth_handler::SessionResponse;
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::cookie_service::{CookieService, REFRESH_COOKIE};
use crate::service::refresh_token_service::{RefreshTokenService, RefreshTokenServiceTrait};
use crate::service::token_service::TokenServiceTrait;
use crate::state::auth_state::AuthState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::AppendHeaders;
use axum::Json;
use tracing::info;

fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| CookieService::extract_cookie(cookies, REFRESH_COOKIE))
}

/// Swap a presented refresh token for a replacement. The old token dies
/// here: rotation is a conditional update keyed on its hash, so of two
/// racing calls with the same token only one wins.
pub(crate) async fn rotate_session<R: UserRepositoryTrait>(
    user_repo: &R,
    refresh_token_service: &RefreshTokenService,
    presented_token: &str,
) -> Result<(User, String), ApiError> {
    let old_hash = refresh_token_service.hash_refresh_token(presented_token);

    let user = user_repo
        .find_by_refresh_token_hash(&old_hash)
        .await
        .ok_or_else(|| {
            secure_log::secure_error!("SECURITY: Refresh with unknown or expired token");
            TokenError::InvalidRefreshToken
        })?;

    let new_refresh_token = refresh_token_service.generate_refresh_token();
    let new_hash = refresh_token_service.hash_refresh_token(&new_refresh_token);
    let expires_at = refresh_token_service.calculate_expiration();

    let rotated = user_repo
        .rotate_refresh_token(user.id, &old_hash, &new_hash, expires_at)
        .await
        .map_err(|e| {
            secure_log::secure_error!("Refresh token rotation failed", e);
            ApiError::Db(crate::error::db_error::DbError::SomethingWentWrong(e.to_string()))
        })?;

    if !rotated {
        // Lost the race, or the token was revoked between lookup and
        // rotation. Either way it is no longer redeemable.
        secure_log::secure_error!(
            "SECURITY: Refresh token already rotated for user ID: {}",
            user.id
        );
        return Err(TokenError::InvalidRefreshToken)?;
    }

    Ok((user, new_refresh_token))
}

/// Exchange a refresh token for a fresh access+refresh pair.
pub async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<SessionResponse, ApiError> {
    let refresh_token =
        refresh_token_from_headers(&headers).ok_or(TokenError::InvalidRefreshToken)?;

    let (user, new_refresh_token) =
        rotate_session(&state.user_repo, &state.refresh_token_service, &refresh_token).await?;

    let access = state.token_service.issue(&user)?;
    let tokens = crate::dto::token_dto::SessionTokensDto {
        token: access.token,
        iat: access.iat,
        exp: access.exp,
        refresh_token: new_refresh_token,
    };

    let [access_cookie, refresh_cookie] = CookieService::session_cookies(&tokens);

    info!("SECURITY: Session refreshed for user ID: {}", user.id);
    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(crate::dto::token_dto::SessionResponseDto {
            message: "Session refreshed".to_string(),
            user: crate::dto::user_dto::UserReadDto::from(user),
            token: tokens.token,
            expires_at: tokens.exp,
        }),
    ))
}

/// Best-effort logout: server-side revocation failures are logged and
/// swallowed, the cookie pair is always cleared.
pub async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> (
    AppendHeaders<[(axum::http::HeaderName, String); 2]>,
    Json<MessageResponseDto>,
) {
    if let Some(refresh_token) = refresh_token_from_headers(&headers) {
        let hash = state.refresh_token_service.hash_refresh_token(&refresh_token);
        if let Some(user) = state.user_repo.find_by_refresh_token_hash(&hash).await {
            match state.user_repo.clear_refresh_token(user.id).await {
                Ok(()) => info!("SECURITY: Logout for user ID: {}", user.id),
                Err(e) => {
                    secure_log::secure_error!("Failed to revoke refresh token on logout", e);
                }
            }
        }
    }

    let [access_cookie, refresh_cookie] = CookieService::clear_cookies();
    (
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(MessageResponseDto {
            message: "Logged out successfully".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryUserRepository;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn seeded_repo() -> (MemoryUserRepository, RefreshTokenService, String, Uuid) {
        crate::config::parameter::init_test_config();
        crate::config::logging::init_test_config();

        let service = RefreshTokenService::new();
        let token = service.generate_refresh_token();
        let user_id = Uuid::now_v7();
        let now = Utc::now();
        let user = User {
            id: user_id,
            email: "alice@example.com".to_string(),
            password: "hashed".to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            refresh_token_hash: Some(service.hash_refresh_token(&token)),
            refresh_token_expires_at: Some(now + Duration::days(7)),
        };
        (MemoryUserRepository::with_user(user), service, token, user_id)
    }

    #[tokio::test]
    async fn test_rotation_invalidates_presented_token() {
        let (repo, service, original, user_id) = seeded_repo();

        let (user, replacement) = rotate_session(&repo, &service, &original).await.unwrap();
        assert_eq!(user.id, user_id);
        assert_ne!(replacement, original);

        // The original is spent; only the replacement still rotates.
        assert!(matches!(
            rotate_session(&repo, &service, &original).await,
            Err(ApiError::Token(TokenError::InvalidRefreshToken))
        ));
        assert!(rotate_session(&repo, &service, &replacement).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_refresh_token_rejected() {
        let (repo, service, _original, _user_id) = seeded_repo();

        assert!(matches!(
            rotate_session(&repo, &service, "never-issued").await,
            Err(ApiError::Token(TokenError::InvalidRefreshToken))
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_rejected() {
        let (repo, service, token, user_id) = seeded_repo();
        let expired_at = Utc::now() - Duration::seconds(1);
        repo.store_refresh_token(user_id, &service.hash_refresh_token(&token), expired_at)
            .await
            .unwrap();

        assert!(matches!(
            rotate_session(&repo, &service, &token).await,
            Err(ApiError::Token(TokenError::InvalidRefreshToken))
        ));
    }
}

