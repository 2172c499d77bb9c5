use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use catering_auth::mailer::{EmailConfig, LogMailer, Mailer, SmtpMailer};
use catering_auth::AuthService;
use catering_cache::{MemoryCache, RedisCache, RedisConfig};
use catering_core::store::CacheStore;
use catering_db::{PgOwnerStore, PgSessionRecordStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catering_api::background::session_sweeper;
use catering_api::config::ServerConfig;
use catering_api::router::build_app_router;
use catering_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catering_api=debug,catering_auth=debug,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = catering_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    catering_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    catering_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Session cache ---
    let cache: Arc<dyn CacheStore> = match RedisConfig::from_env() {
        Some(redis_config) => {
            let redis = RedisCache::connect(&redis_config)
                .await
                .expect("Failed to connect to Redis");
            redis.health_check().await.expect("Redis health check failed");
            tracing::info!("Redis session cache connected");
            Arc::new(redis)
        }
        None => {
            tracing::warn!("REDIS_URL not set, sessions are cached in process memory");
            Arc::new(MemoryCache::new())
        }
    };

    // --- Mailer ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, password reset links are only logged");
            Arc::new(LogMailer)
        }
    };

    // --- Auth service ---
    let auth = Arc::new(
        AuthService::from_config(
            &config.auth,
            Arc::new(PgOwnerStore::new(pool.clone())),
            Arc::new(PgSessionRecordStore::new(pool.clone())),
            cache,
            mailer,
        )
        .expect("Invalid auth configuration"),
    );

    // --- Session sweeper ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(session_sweeper::run(
        Arc::clone(&auth),
        Duration::from_secs(config.session_sweep_interval_secs),
        sweep_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool: Some(pool),
        config: Arc::new(config.clone()),
        auth,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Session sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
