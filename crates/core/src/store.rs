//! Narrow interfaces the auth core consumes from its storage collaborators.
//!
//! Lookups return `Result<Option<T>, StoreError>`: `Ok(Some(_))` is a hit,
//! `Ok(None)` is an ordinary negative result and `Err(_)` is an I/O fault.
//! Implementations hold no business logic.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::owner::Owner;
use crate::session::{SessionRecord, StoredSession};
use crate::types::DbId;

/// Boxed error source carried by [`StoreError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fault raised by a record store or cache store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("durable store error: {0}")]
    Durable(#[source] BoxError),

    #[error("cache store error: {0}")]
    Cache(#[source] BoxError),

    #[error("delete of nonexistent session {sid}")]
    NoRowsAffected { sid: String },
}

impl StoreError {
    pub fn durable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Durable(Box::new(err))
    }

    pub fn cache(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Cache(Box::new(err))
    }
}

/// Read/update access to owner accounts in the record store.
#[async_trait]
pub trait OwnerStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Owner>, StoreError>;

    /// Replace the password hash of the owner with `email`.
    ///
    /// Returns `false` when no owner has that email.
    async fn update_password_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError>;
}

/// Durable session rows keyed by `sid`.
#[async_trait]
pub trait SessionRecordStore: Send + Sync {
    /// Insert a new row. A `sid` collision is a [`StoreError::Durable`].
    async fn insert(&self, record: &SessionRecord) -> Result<(), StoreError>;

    async fn find_by_sid(&self, sid: &str) -> Result<Option<StoredSession>, StoreError>;

    /// Delete the row for `sid`, returning the number of affected rows.
    async fn delete_by_sid(&self, sid: &str) -> Result<u64, StoreError>;

    /// Delete every row whose `expired_at` has passed.
    async fn delete_expired(&self) -> Result<u64, StoreError>;
}

/// The subset of a Redis-like cache the session protocol needs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Write `fields` into the hash at `key` and (re)set its TTL.
    async fn hash_set(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// All fields of the hash at `key`; empty when the key is missing.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    /// Set `key` to `value` only if it does not exist. Returns whether it was set.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete `keys`, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError>;
}
