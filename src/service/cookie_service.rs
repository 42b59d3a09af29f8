use crate::config::parameter;
use crate::dto::token_dto::SessionTokensDto;

pub const AUTH_COOKIE: &str = "cajpro_auth_token";
pub const REFRESH_COOKIE: &str = "cajpro_refresh_token";

/// Sole producer of the session `Set-Cookie` pair. Handlers never
/// format cookies themselves, which keeps the security flags uniform
/// across every path that touches the session.
pub struct CookieService;

impl CookieService {
    fn build(name: &str, value: &str, max_age_seconds: i64) -> String {
        format!(
            "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
            name, value, max_age_seconds
        )
    }

    /// `Set-Cookie` values installing an access+refresh pair.
    pub fn session_cookies(tokens: &SessionTokensDto) -> [String; 2] {
        let access_ttl = parameter::get_i64("JWT_TTL_SECONDS");
        let refresh_ttl = parameter::get_i64("REFRESH_TOKEN_TTL_DAYS") * 24 * 60 * 60;

        [
            Self::build(AUTH_COOKIE, &tokens.token, access_ttl),
            Self::build(REFRESH_COOKIE, &tokens.refresh_token, refresh_ttl),
        ]
    }

    /// `Set-Cookie` values removing the pair. Always both: an access
    /// token is never left behind without its refresh token or vice
    /// versa.
    pub fn clear_cookies() -> [String; 2] {
        [
            Self::build(AUTH_COOKIE, "", 0),
            Self::build(REFRESH_COOKIE, "", 0),
        ]
    }

    /// Read a named cookie out of a `Cookie` request header.
    pub fn extract_cookie(cookie_header: &str, name: &str) -> Option<String> {
        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some((cookie_name, value)) = cookie.split_once('=') {
                if cookie_name.trim() == name && !value.trim().is_empty() {
                    return Some(value.trim().to_string());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tokens() -> SessionTokensDto {
        crate::config::parameter::init_test_config();
        SessionTokensDto {
            token: "access.jwt.value".to_string(),
            iat: 0,
            exp: 3600,
            refresh_token: "opaque-refresh-value".to_string(),
        }
    }

    #[test]
    fn test_session_cookie_flags() {
        let [access, refresh] = CookieService::session_cookies(&test_tokens());

        for cookie in [&access, &refresh] {
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("Secure"));
            assert!(cookie.contains("SameSite=Lax"));
            assert!(cookie.contains("Path=/"));
        }
        assert!(access.starts_with("cajpro_auth_token=access.jwt.value;"));
        assert!(access.contains("Max-Age=3600"));
        assert!(refresh.starts_with("cajpro_refresh_token=opaque-refresh-value;"));
        assert!(refresh.contains(&format!("Max-Age={}", 7 * 24 * 60 * 60)));
    }

    #[test]
    fn test_clear_cookies_zero_max_age() {
        crate::config::parameter::init_test_config();
        let [access, refresh] = CookieService::clear_cookies();

        assert!(access.starts_with("cajpro_auth_token=;"));
        assert!(access.contains("Max-Age=0"));
        assert!(refresh.starts_with("cajpro_refresh_token=;"));
        assert!(refresh.contains("Max-Age=0"));
        // Clearing keeps the same flags as setting.
        assert!(access.contains("HttpOnly") && access.contains("SameSite=Lax"));
    }

    #[test]
    fn test_extract_cookie() {
        let header = "cajpro_auth_token=abc123; other=x; cajpro_refresh_token=def456";

        assert_eq!(
            CookieService::extract_cookie(header, AUTH_COOKIE),
            Some("abc123".to_string())
        );
        assert_eq!(
            CookieService::extract_cookie(header, REFRESH_COOKIE),
            Some("def456".to_string())
        );
        assert_eq!(CookieService::extract_cookie(header, "missing"), None);
        // A cleared (empty) cookie reads as absent.
        assert_eq!(
            CookieService::extract_cookie("cajpro_auth_token=", AUTH_COOKIE),
            None
        );
    }
}
