//! Session cookie and CSRF token handling

use axum::http::{header, HeaderMap};
use rand::RngCore;

use crate::error::{GameError, GameResult};

pub const SESSION_COOKIE: &str = "rog_sid";
const CSRF_TOKEN_BYTES: usize = 32;
const MAX_USERNAME_LEN: usize = 32;

/// Generate a fresh random CSRF token (hex encoded)
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; CSRF_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check a submitted token against the one stored in the session
pub fn verify_csrf(expected: &str, provided: Option<&str>) -> GameResult<()> {
    match provided {
        Some(token) if !token.is_empty() && constant_time_eq(expected.as_bytes(), token.as_bytes()) => {
            Ok(())
        }
        _ => Err(GameError::InvalidCsrfToken),
    }
}

/// Usernames are 1-32 chars of ASCII letters, digits, `_` and `-`
pub fn validate_username(username: &str) -> GameResult<String> {
    let username = username.trim();
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(GameError::invalid(format!(
            "Username must be between 1 and {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(GameError::invalid(
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(username.to_string())
}

/// Extract the session id from the Cookie header(s)
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookies) = value.to_str() else {
            continue;
        };
        for pair in cookies.split(';') {
            let Some((k, v)) = pair.trim().split_once('=') else {
                continue;
            };
            if k == SESSION_COOKIE && !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}

pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, session_id
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}
