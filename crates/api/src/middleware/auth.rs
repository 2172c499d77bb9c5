//! Extractors that gather a [`RequestAuth`] from headers and cookies.
//!
//! Neither extractor rejects a request for missing credentials; the auth
//! service decides what is required per operation.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use catering_auth::model::RequestAuth;
use cookie::Cookie;

use crate::cookies::{RESET_COOKIE, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Value of cookie `name` across all `Cookie` headers.
fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

/// Session-scoped credentials: the `sid` cookie, the bearer token, and the
/// session `sid` resolves to.
///
/// A store fault while resolving the session fails the request with 500.
#[derive(Debug, Clone)]
pub struct SessionAuth(pub RequestAuth);

impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let sid = cookie_value(parts, SESSION_COOKIE);
        let session = match sid.as_deref() {
            Some(sid) => state.auth.session(sid).await?,
            None => None,
        };

        Ok(Self(RequestAuth {
            sid,
            bearer_token: bearer_token(parts),
            session,
        }))
    }
}

/// Password-reset credentials: the bearer token, falling back to the `rpt`
/// cookie set by forgot-password.
#[derive(Debug, Clone)]
pub struct ResetAuth(pub RequestAuth);

impl FromRequestParts<AppState> for ResetAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(RequestAuth {
            bearer_token: bearer_token(parts).or_else(|| cookie_value(parts, RESET_COOKIE)),
            ..RequestAuth::default()
        }))
    }
}
