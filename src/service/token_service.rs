use crate::config::parameter;
use crate::dto::token_dto::{AccessClaims, TokenReadDto};
use crate::entity::user::User;
use crate::error::token_error::TokenError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

const ISSUER: &str = "cajpro-auth";
const AUDIENCE: &str = "cajpro-clients";

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl_seconds: i64,
}

pub trait TokenServiceTrait {
    fn new() -> Result<Self, TokenError>
    where
        Self: Sized;
    fn issue(&self, user: &User) -> Result<TokenReadDto, TokenError>;
    fn issue_with_ttl(&self, user: &User, ttl_seconds: i64) -> Result<TokenReadDto, TokenError>;
    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError>;
}

impl TokenServiceTrait for TokenService {
    fn new() -> Result<Self, TokenError> {
        let secret = parameter::get("JWT_SECRET");

        // 256-bit minimum for the HS256 signing key; anything shorter is
        // a fatal misconfiguration.
        if secret.len() < 32 {
            return Err(TokenError::TokenCreationError(
                "JWT secret must be at least 32 bytes (256 bits). Current length: ".to_string()
                    + &secret.len().to_string(),
            ));
        }

        Ok(Self {
            secret,
            ttl_seconds: parameter::get_i64("JWT_TTL_SECONDS"),
        })
    }

    fn issue(&self, user: &User) -> Result<TokenReadDto, TokenError> {
        self.issue_with_ttl(user, self.ttl_seconds)
    }

    fn issue_with_ttl(&self, user: &User, ttl_seconds: i64) -> Result<TokenReadDto, TokenError> {
        let iat = chrono::Utc::now().timestamp();
        let exp = iat
            .checked_add(ttl_seconds)
            .ok_or_else(|| {
                TokenError::TokenCreationError("Token expiration calculation overflow".to_string())
            })?;

        let claims = AccessClaims {
            sub: user.id,
            is_admin: user.is_admin,
            iat,
            exp,
            jti: Uuid::now_v7().to_string(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| TokenError::TokenCreationError(e.to_string()))?;

        Ok(TokenReadDto { token, iat, exp })
    }

    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            _ => TokenError::InvalidToken,
        })?;

        // exp == now counts as expired; jsonwebtoken alone lets the
        // boundary second pass.
        if token_data.claims.exp <= chrono::Utc::now().timestamp() {
            return Err(TokenError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

/// Pull the subject id out of a token without checking the signature or
/// expiry. Only suitable for diagnostics such as log correlation; every
/// authorization decision goes through [`TokenServiceTrait::verify`].
pub fn extract_subject(token: &str) -> Option<Uuid> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.sub)
}
