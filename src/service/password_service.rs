use crate::config::logging::secure_log;
use crate::config::parameter;
use crate::error::api_error::ApiError;
use crate::error::db_error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// One-way credential material: bcrypt for passwords, random opaque
/// tokens hashed with SHA-256 for password resets.
#[derive(Clone)]
pub struct PasswordService {
    bcrypt_cost: u32,
    reset_token_ttl_minutes: i64,
}

#[async_trait]
pub trait PasswordServiceTrait {
    fn new() -> Self;
    fn hash_password(&self, password: &str) -> Result<String, ApiError>;
    async fn verify_password(&self, password: &str, hash: &str) -> bool;
    fn generate_reset_token(&self) -> String;
    fn hash_reset_token(&self, token: &str) -> String;
    fn reset_token_expiration(&self) -> DateTime<Utc>;
}

#[cfg(test)]
impl PasswordService {
    pub(crate) fn with_low_cost() -> Self {
        // Low cost keeps bcrypt tests fast; production cost comes from
        // configuration.
        Self {
            bcrypt_cost: 4,
            reset_token_ttl_minutes: 30,
        }
    }
}

#[async_trait]
impl PasswordServiceTrait for PasswordService {
    fn new() -> Self {
        Self {
            bcrypt_cost: parameter::get_u64("BCRYPT_COST") as u32,
            reset_token_ttl_minutes: parameter::get_i64("RESET_TOKEN_TTL_MINUTES"),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(|e| {
            secure_log::secure_error!("Failed to hash password", e);
            ApiError::Db(DbError::SomethingWentWrong("Password hashing failed".to_string()))
        })
    }

    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();

        // bcrypt is CPU-bound and the floor below sleeps; both run on a
        // blocking thread so async workers stay free.
        let result = tokio::task::spawn_blocking(move || {
            let start_time = std::time::Instant::now();

            let result = bcrypt::verify(&password, &hash);

            // Flatten response-time variance between the verify outcomes.
            let elapsed = start_time.elapsed();
            let min_time = std::time::Duration::from_millis(100);
            if elapsed < min_time {
                std::thread::sleep(min_time - elapsed);
            }

            result
        })
        .await;

        match result {
            Ok(Ok(is_valid)) => is_valid,
            Ok(Err(e)) => {
                // A malformed stored hash reads as a failed login rather
                // than an observable error.
                secure_log::secure_error!("Password verification system error", e);
                false
            }
            Err(e) => {
                secure_log::secure_error!("Password verification task failed", e);
                false
            }
        }
    }

    fn generate_reset_token(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);

        use base64::Engine;
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    fn hash_reset_token(&self, token: &str) -> String {
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

    fn reset_token_expiration(&self) -> DateTime<Utc> {
        Utc::now() + Duration::minutes(self.reset_token_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> PasswordService {
        crate::config::parameter::init_test_config();
        crate::config::logging::init_test_config();
        PasswordService::with_low_cost()
    }

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let service = test_service();
        let hash = service.hash_password("password123").unwrap();

        assert_ne!(hash, "password123");
        assert!(service.verify_password("password123", &hash).await);
        assert!(!service.verify_password("password124", &hash).await);
    }

    #[tokio::test]
    async fn test_verify_with_malformed_hash_is_false() {
        let service = test_service();
        assert!(!service.verify_password("password123", "not-a-bcrypt-hash").await);
    }

    #[test]
    fn test_reset_tokens_unique_and_hash_deterministic() {
        let service = test_service();
        let token1 = service.generate_reset_token();
        let token2 = service.generate_reset_token();
        assert_ne!(token1, token2);

        let hash = service.hash_reset_token(&token1);
        assert_eq!(hash, service.hash_reset_token(&token1));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, token1);
    }

    #[test]
    fn test_reset_token_expiration_window() {
        let service = test_service();
        let expires = service.reset_token_expiration();
        let expected = Utc::now() + Duration::minutes(30);
        assert!((expires - expected).num_seconds().abs() < 10);
    }
}
