use dotenv;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{error, info, warn};

static CONFIG: OnceLock<HashMap<String, String>> = OnceLock::new();

/// Default configuration values
const DEFAULTS: &[(&str, &str)] = &[
    ("SERVER_ADDRESS", "127.0.0.1"),
    ("SERVER_PORT", "8080"),
    ("JWT_TTL_SECONDS", "3600"),
    ("REFRESH_TOKEN_TTL_DAYS", "7"),
    ("RESET_TOKEN_TTL_MINUTES", "30"),
    ("BCRYPT_COST", "12"),
    ("LOG_LEVEL", "info"),
    // Debug-build-only middleware bypass; ignored entirely in release builds.
    ("AUTH_DEV_BYPASS", "false"),
];

pub fn init() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment file: {:?}", path),
        Err(_) => warn!("No .env file found, using system environment variables"),
    }

    let mut config = HashMap::new();

    // Load defaults first
    for (key, value) in DEFAULTS {
        config.insert(key.to_string(), value.to_string());
    }

    // Override with environment variables. This also picks up keys that
    // have no default (JWT_SECRET, DATABASE_URL, AUTH_DEV_BYPASS_TOKEN).
    for (key, value) in std::env::vars() {
        config.insert(key, value);
    }

    if CONFIG.set(config).is_err() {
        error!("Configuration already initialized");
    } else {
        info!("Configuration initialized successfully");
    }
}

pub fn get(parameter: &str) -> String {
    CONFIG
        .get()
        .and_then(|config| config.get(parameter))
        .cloned()
        .unwrap_or_else(|| {
            error!("Configuration parameter '{}' not found", parameter);
            panic!("Required configuration parameter '{}' is missing", parameter);
        })
}

pub fn get_optional(parameter: &str) -> Option<String> {
    CONFIG
        .get()
        .and_then(|config| config.get(parameter))
        .cloned()
}

pub fn get_i64(parameter: &str) -> i64 {
    let value = get(parameter);
    value.parse::<i64>().unwrap_or_else(|_| {
        error!("Configuration parameter '{}' is not a valid i64: {}", parameter, value);
        panic!("Configuration parameter '{}' is not a valid i64", parameter);
    })
}

pub fn get_u64(parameter: &str) -> u64 {
    let value = get(parameter);
    value.parse::<u64>().unwrap_or_else(|_| {
        error!("Configuration parameter '{}' is not a valid u64: {}", parameter, value);
        panic!("Configuration parameter '{}' is not a valid u64", parameter);
    })
}

pub fn get_bool(parameter: &str) -> bool {
    let value = get(parameter).to_lowercase();
    matches!(value.as_str(), "true" | "1" | "yes" | "on")
}

/// Seed the configuration table for unit tests. Safe to call from
/// multiple tests; only the first call wins, which is fine because all
/// tests use the same defaults plus a fixed test secret.
#[cfg(test)]
pub fn init_test_config() {
    let mut config = HashMap::new();
    for (key, value) in DEFAULTS {
        config.insert(key.to_string(), value.to_string());
    }
    config.insert(
        "JWT_SECRET".to_string(),
        "unit-test-signing-secret-0123456789abcdef".to_string(),
    );
    let _ = CONFIG.set(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_present() {
        init_test_config();
        assert_eq!(get_i64("JWT_TTL_SECONDS"), 3600);
        assert_eq!(get_i64("REFRESH_TOKEN_TTL_DAYS"), 7);
        assert!(!get_bool("AUTH_DEV_BYPASS"));
    }

    #[test]
    fn test_get_optional_missing() {
        init_test_config();
        assert!(get_optional("NO_SUCH_PARAMETER").is_none());
    }
}
