//! Authentication and session core.
//!
//! - [`token`] -- signed, typed, expiring JWTs (access / refresh / password-reset).
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`session_store`] -- session reads/writes reconciled across the durable
//!   record store and the cache store.
//! - [`service`] -- login, logout, session lookup, access-token renewal and
//!   password reset built on the three above.

pub mod config;
pub mod error;
pub mod mailer;
pub mod model;
pub mod password;
pub mod service;
pub mod session_store;
pub mod token;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::AuthConfig;
pub use error::{AuthError, ErrorKind};
pub use service::AuthService;
pub use session_store::{SessionStore, SessionStoreAdapter};
