use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::models::ErrorBody;

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_COOKIE: &str = "admin_session";

/// Session lifetime (7 days), matching the cookie Max-Age.
const SESSION_TTL_SECS: i64 = 7 * 24 * 3600;

/// Constant-time comparison of the submitted password against the shared
/// admin secret.
pub fn verify_password(candidate: &str, secret: &str) -> bool {
    !secret.is_empty() && candidate.as_bytes().ct_eq(secret.as_bytes()).into()
}

fn sign(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Mint a session token: `<expiry-unix>.<hex hmac(secret, expiry-unix)>`.
/// Stateless, so a restart does not log the admin out.
pub fn issue_token(secret: &str) -> String {
    let expires = chrono::Utc::now().timestamp() + SESSION_TTL_SECS;
    format!("{}.{}", expires, sign(secret, &expires.to_string()))
}

/// Verify a session token: signature must match and the expiry must be in
/// the future.
pub fn verify_token(token: &str, secret: &str) -> bool {
    let Some((expires_str, mac_hex)) = token.split_once('.') else {
        return false;
    };
    let Ok(expires) = expires_str.parse::<i64>() else {
        return false;
    };
    if expires <= chrono::Utc::now().timestamp() {
        return false;
    }
    let expected = sign(secret, expires_str);
    expected.as_bytes().ct_eq(mac_hex.as_bytes()).into()
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{ADMIN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_TTL_SECS}"
    )
}

pub fn clear_cookie() -> String {
    format!("{ADMIN_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Pull the session token out of the Cookie header.
fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == ADMIN_COOKIE).then_some(value)
    })
}

/// Guard for admin handlers: 401 unless a valid session cookie is present.
pub fn require_admin(
    headers: &HeaderMap,
    secret: &str,
) -> Result<(), (StatusCode, Json<ErrorBody>)> {
    let authorized = token_from_headers(headers)
        .map(|token| verify_token(token, secret))
        .unwrap_or(false);
    if authorized {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Not authorized")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "top-secret";

    #[test]
    fn test_password_match() {
        assert!(verify_password("top-secret", SECRET));
        assert!(!verify_password("Top-Secret", SECRET));
        assert!(!verify_password("", SECRET));
    }

    #[test]
    fn test_empty_secret_never_verifies() {
        // A misconfigured blank ADMIN_SECRET must not allow blank logins.
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_token_roundtrip() {
        let token = issue_token(SECRET);
        assert!(verify_token(&token, SECRET));
    }

    #[test]
    fn test_token_wrong_secret() {
        let token = issue_token(SECRET);
        assert!(!verify_token(&token, "other-secret"));
    }

    #[test]
    fn test_token_tampered_expiry() {
        let token = issue_token(SECRET);
        let (_, mac) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", i64::MAX, mac);
        assert!(!verify_token(&forged, SECRET));
    }

    #[test]
    fn test_token_expired() {
        let past = chrono::Utc::now().timestamp() - 10;
        let stale = format!("{}.{}", past, sign(SECRET, &past.to_string()));
        assert!(!verify_token(&stale, SECRET));
    }

    #[test]
    fn test_token_garbage() {
        assert!(!verify_token("", SECRET));
        assert!(!verify_token("no-dot-here", SECRET));
        assert!(!verify_token("abc.def", SECRET));
    }

    #[test]
    fn test_cookie_extraction() {
        let mut headers = HeaderMap::new();
        let token = issue_token(SECRET);
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; admin_session={token}; lang=en"))
                .unwrap(),
        );
        assert!(require_admin(&headers, SECRET).is_ok());
    }

    #[test]
    fn test_missing_cookie_rejected() {
        let headers = HeaderMap::new();
        assert!(require_admin(&headers, SECRET).is_err());
    }
}
