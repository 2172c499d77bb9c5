//! Request and response types of the auth operations.

use catering_core::session::Session;
use catering_core::types::DbId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Outcome of a login.
///
/// When the owner already has a live session, only `sid` is set and no new
/// tokens are issued.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(skip)]
    pub sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl LoginResponse {
    /// Whether this login reused a live session instead of creating one.
    pub fn is_existing_session(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// The externally visible part of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub sid: String,
    pub owner_id: DbId,
    pub jti: String,
    pub valid: bool,
}

impl From<Session> for SessionSnapshot {
    fn from(session: Session) -> Self {
        Self {
            sid: session.sid,
            owner_id: session.owner_id,
            jti: session.jti,
            valid: session.valid,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewResponse {
    pub access_token: String,
    /// RFC 3339 expiry of `access_token`.
    pub expired_at: String,
}

/// Request-scoped authentication inputs, gathered by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct RequestAuth {
    /// Value of the `sid` cookie.
    pub sid: Option<String>,
    /// Bearer token from the `Authorization` header, or the `rpt` cookie for
    /// password resets.
    pub bearer_token: Option<String>,
    /// Session resolved from `sid`, when one exists.
    pub session: Option<SessionSnapshot>,
}
