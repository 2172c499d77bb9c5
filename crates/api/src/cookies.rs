//! `Set-Cookie` values for the session (`sid`) and password-reset (`rpt`) cookies.

use std::time::Duration;

use cookie::{Cookie, SameSite};

use crate::config::ServerConfig;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "sid";
/// Cookie carrying the password-reset token.
pub const RESET_COOKIE: &str = "rpt";

fn max_age(ttl: Duration) -> cookie::time::Duration {
    cookie::time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

fn build(name: &'static str, value: String, ttl: Duration, config: &ServerConfig) -> String {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.secure_cookies)
        .max_age(max_age(ttl))
        .build()
        .to_string()
}

/// `sid` cookie living as long as the refresh token.
pub fn session_cookie(sid: &str, config: &ServerConfig) -> String {
    build(SESSION_COOKIE, sid.to_string(), config.auth.refresh_token_ttl, config)
}

/// `rpt` cookie living as long as the reset token.
pub fn reset_cookie(token: &str, config: &ServerConfig) -> String {
    build(RESET_COOKIE, token.to_string(), config.auth.access_token_ttl, config)
}

/// Expire cookie `name` on the client.
pub fn clear_cookie(name: &'static str, config: &ServerConfig) -> String {
    build(name, String::new(), Duration::ZERO, config)
}
