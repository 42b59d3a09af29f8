use crate::config::database::Database;
use crate::error::token_error::TokenError;
use crate::repository::user_repository::UserRepository;
use crate::service::token_service::{TokenService, TokenServiceTrait};
use std::sync::Arc;

/// State handed to the auth middleware: just enough to verify a token
/// and resolve its subject to a user row.
#[derive(Clone)]
pub struct TokenState {
    pub token_service: TokenService,
    pub user_repo: UserRepository,
}

impl TokenState {
    pub fn new(db_conn: &Arc<Database>) -> Result<Self, TokenError> {
        Ok(Self {
            token_service: TokenService::new()?,
            user_repo: UserRepository::new(db_conn),
        })
    }
}
