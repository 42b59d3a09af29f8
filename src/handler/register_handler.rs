use crate::config::logging::secure_log;
use crate::dto::user_dto::UserRegisterDto;
use crate::error::{api_error::ApiError, request_error::ValidatedRequest};
use crate::handler::auth_handler::{issue_session, SessionResponse};
use crate::state::auth_state::AuthState;
use axum::extract::State;
use axum::http::StatusCode;

pub async fn register(
    State(state): State<AuthState>,
    ValidatedRequest(payload): ValidatedRequest<UserRegisterDto>,
) -> Result<(StatusCode, SessionResponse), ApiError> {
    secure_log::sensitive_debug!("Registration attempt for email: {}", payload.email);

    let user = state.user_service.create_user(payload).await?;

    // Auto-login: a fresh registration walks away with a live session.
    let session = issue_session(&state, &user, "Registration successful").await?;
    Ok((StatusCode::CREATED, session))
}
