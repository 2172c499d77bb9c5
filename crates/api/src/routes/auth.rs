//! Route definitions for the `/auth` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /login               -> login
/// DELETE /logout              -> logout
/// PUT    /forgot-password     -> forgot_password
/// GET    /renew-access-token  -> renew_access_token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", delete(auth::logout))
        .route("/forgot-password", put(auth::forgot_password))
        .route("/renew-access-token", get(auth::renew_access_token))
}
