use std::sync::Arc;

use catering_auth::AuthService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, probed by `/health`. `None` when the auth core runs on
    /// in-memory stores.
    pub pool: Option<catering_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthService>,
}
