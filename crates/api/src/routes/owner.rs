//! Route definitions for the `/owner` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::owner;
use crate::state::AppState;

/// Routes mounted at `/owner`.
///
/// ```text
/// PUT /reset-password/{id}  -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/reset-password/{id}", put(owner::reset_password))
}
