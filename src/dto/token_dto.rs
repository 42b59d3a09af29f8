use crate::dto::user_dto::UserReadDto;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decoded access token payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenReadDto {
    pub token: String,
    pub iat: i64,
    pub exp: i64,
}

/// Access + refresh pair as issued to a client. The two are always
/// created together and set as a cookie pair.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionTokensDto {
    pub token: String,
    pub iat: i64,
    pub exp: i64,
    pub refresh_token: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SessionResponseDto {
    pub message: String,
    pub user: UserReadDto,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub message: String,
}
