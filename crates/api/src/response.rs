//! Shared response envelope types for API handlers.

use serde::Serialize;

/// `{ "auth": T }` envelope used by the token-issuing endpoints.
#[derive(Debug, Serialize)]
pub struct AuthEnvelope<T: Serialize> {
    pub auth: T,
}

/// `{ "message": "..." }` body for endpoints with nothing else to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
