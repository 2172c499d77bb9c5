#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use catering_api::config::ServerConfig;
use catering_api::router::build_app_router;
use catering_api::state::AppState;
use catering_auth::config::PasswordCost;
use catering_auth::session_store::SessionStoreAdapter;
use catering_auth::testing::{fast_hasher, InMemoryOwners, InMemorySessionRecords, RecordingMailer};
use catering_auth::token::JwtCodec;
use catering_auth::{AuthConfig, AuthService};
use catering_cache::MemoryCache;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const EMAIL: &str = "test@example.com";
pub const PASSWORD: &str = "12345pass";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        session_sweep_interval_secs: 3600,
        secure_cookies: false,
        auth: AuthConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_token_ttl: Duration::from_secs(900),
            refresh_token_ttl: Duration::from_secs(3600),
            reset_link_base: "http://localhost:9000".to_string(),
            password_cost: PasswordCost {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        },
    }
}

/// The router plus handles on its in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub owners: Arc<InMemoryOwners>,
    pub records: Arc<InMemorySessionRecords>,
    pub mailer: Arc<RecordingMailer>,
}

/// Build the full application router over in-memory stores, seeded with one
/// owner (`EMAIL` / `PASSWORD`).
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let owners = Arc::new(InMemoryOwners::new().with_owner(1, "Test Owner", EMAIL, PASSWORD));
    let records = Arc::new(InMemorySessionRecords::new());
    let mailer = Arc::new(RecordingMailer::new());

    let sessions = SessionStoreAdapter::new(
        records.clone(),
        Arc::new(MemoryCache::new()),
        config.auth.access_token_ttl,
        config.auth.refresh_token_ttl,
    );
    let auth = AuthService::new(
        owners.clone(),
        Arc::new(sessions),
        Arc::new(JwtCodec::new(
            config.auth.access_secret.as_bytes(),
            config.auth.refresh_secret.as_bytes(),
        )),
        Arc::new(fast_hasher()),
        mailer.clone(),
        config.auth.reset_link_base.clone(),
    );

    let state = AppState {
        pool: None,
        config: Arc::new(config.clone()),
        auth: Arc::new(auth),
    };

    TestApp {
        router: build_app_router(state, &config),
        owners,
        records,
        mailer,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with an optional JSON body, bearer token and cookie header.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    bearer: Option<&str>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None, None).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` of the first `Set-Cookie` header for `name`, if any.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

/// Send a raw body with the given content type, bypassing JSON encoding.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: &'static str,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();

    app.clone().oneshot(request).await.unwrap()
}
