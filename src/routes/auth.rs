use crate::handler::{auth_handler, password_handler, refresh_handler, register_handler};
use crate::state::auth_state::AuthState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn public_routes() -> Router<AuthState> {
    Router::<AuthState>::new()
        .route("/auth/register", post(register_handler::register))
        .route("/auth/login", post(auth_handler::login))
        .route("/auth/logout", post(refresh_handler::logout))
        .route("/auth/refresh", post(refresh_handler::refresh))
        .route("/auth/password-reset/request", post(password_handler::request_reset))
        .route("/auth/password-reset/reset", post(password_handler::submit_reset))
}

/// Routes that sit behind the auth middleware.
pub fn protected_routes() -> Router<AuthState> {
    Router::<AuthState>::new()
        .route("/auth/password", post(password_handler::change_password))
        .route("/auth/me", get(auth_handler::me))
}
