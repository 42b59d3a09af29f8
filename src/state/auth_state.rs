use crate::config::database::Database;
use crate::error::token_error::TokenError;
use crate::repository::reset_token_repository::ResetTokenRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::password_service::{PasswordService, PasswordServiceTrait};
use crate::service::refresh_token_service::{RefreshTokenService, RefreshTokenServiceTrait};
use crate::service::token_service::{TokenService, TokenServiceTrait};
use crate::service::user_service::UserService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub(crate) token_service: TokenService,
    pub(crate) refresh_token_service: RefreshTokenService,
    pub(crate) password_service: PasswordService,
    pub(crate) user_service: UserService,
    pub(crate) user_repo: UserRepository,
    pub(crate) reset_token_repo: ResetTokenRepository,
}

impl AuthState {
    pub fn new(db_conn: &Arc<Database>) -> Result<AuthState, TokenError> {
        Ok(Self {
            token_service: TokenService::new()?,
            refresh_token_service: RefreshTokenService::new(),
            password_service: PasswordService::new(),
            user_service: UserService::new(db_conn),
            user_repo: UserRepository::new(db_conn),
            reset_token_repo: ResetTokenRepository::new(db_conn),
        })
    }
}
