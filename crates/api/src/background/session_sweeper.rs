//! Periodic deletion of durable sessions whose refresh window has closed.
//!
//! Cache entries expire on their own; the durable rows do not, so this job
//! keeps the `auth` table from growing without bound.

use std::sync::Arc;
use std::time::Duration;

use catering_auth::AuthService;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop every `every` until `cancel` is triggered.
///
/// The first sweep runs immediately.
pub async fn run(auth: Arc<AuthService>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session sweeper started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match auth.sweep_expired_sessions().await {
                    Ok(0) => tracing::debug!("Session sweep: nothing to delete"),
                    Ok(deleted) => {
                        tracing::info!(deleted, "Session sweep: deleted expired sessions")
                    }
                    Err(e) => tracing::error!(error = %e, "Session sweep failed"),
                }
            }
        }
    }
}
