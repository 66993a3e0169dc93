// src/auth/admin.rs
use astra::Request;

use crate::auth::token::{hash_token, hashes_equal};

pub const SESSION_COOKIE: &str = "cheema_admin";

/// Shared-secret gate for the admin dashboard.
///
/// The secret is a single plaintext value from configuration. Both sides are
/// hashed before comparing so the comparison does not depend on input length.
pub fn check_password(configured: &str, candidate: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    hashes_equal(&hash_token(configured), &hash_token(candidate))
}

/// Value of the admin session cookie, if the request carries one.
pub fn session_token(req: &Request) -> Option<String> {
    req.headers()
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, ttl_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
