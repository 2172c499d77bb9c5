pub mod auth;
pub mod health;
pub mod owner;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                   login (POST)
/// /auth/logout                  logout (DELETE, sid cookie + bearer)
/// /auth/forgot-password         forgot password (PUT)
/// /auth/renew-access-token      renew access token (GET, sid cookie + refresh bearer)
///
/// /owner/reset-password/{id}    reset password (PUT, bearer or rpt cookie)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/owner", owner::router())
}
