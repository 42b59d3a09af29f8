use crate::config::parameter;
use crate::dto::token_dto::SessionTokensDto;
use crate::entity::user::User;
use crate::error::token_error::TokenError;
use crate::service::token_service::{TokenService, TokenServiceTrait};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

#[derive(Clone)]
pub struct RefreshTokenService {
    refresh_token_ttl_days: i64,
}

pub trait RefreshTokenServiceTrait {
    fn new() -> Self;
    fn generate_refresh_token(&self) -> String;
    fn hash_refresh_token(&self, token: &str) -> String;
    fn calculate_expiration(&self) -> DateTime<Utc>;
    fn mint_session(
        &self,
        user: &User,
        token_service: &TokenService,
    ) -> Result<SessionTokensDto, TokenError>;
}

impl RefreshTokenServiceTrait for RefreshTokenService {
    fn new() -> Self {
        Self {
            refresh_token_ttl_days: parameter::get_i64("REFRESH_TOKEN_TTL_DAYS"),
        }
    }

    fn generate_refresh_token(&self) -> String {
        // 32 bytes of OS randomness, base64 for transport; the token is
        // opaque and never decoded server-side.
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);

        use base64::Engine;
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    fn hash_refresh_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let result = hasher.finalize();

        let mut hex_string = String::with_capacity(64);
        for byte in result {
            use std::fmt::Write;
            write!(hex_string, "{:02x}", byte).unwrap();
        }
        hex_string
    }

    fn calculate_expiration(&self) -> DateTime<Utc> {
        Utc::now() + Duration::days(self.refresh_token_ttl_days)
    }

    /// Build the access+refresh pair for a user. The two are never
    /// issued separately.
    fn mint_session(
        &self,
        user: &User,
        token_service: &TokenService,
    ) -> Result<SessionTokensDto, TokenError> {
        let access = token_service.issue(user)?;
        let refresh_token = self.generate_refresh_token();

        Ok(SessionTokensDto {
            token: access.token,
            iat: access.iat,
            exp: access.exp,
            refresh_token,
        })
    }
}
