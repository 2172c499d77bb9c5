//! In-process cache store with Redis-like TTL semantics.
//!
//! Expired keys are dropped on access, and a purge pass over the whole map
//! runs on writes at most once per purge interval.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use catering_core::store::{CacheStore, StoreError};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default gap between two full purge passes.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Raised when a key is accessed with an operation for another value type.
#[derive(Debug, thiserror::Error)]
#[error("WRONGTYPE operation against key '{0}' holding the wrong kind of value")]
pub struct WrongType(String);

#[derive(Debug, Clone)]
enum Value {
    Hash(HashMap<String, String>),
    Str(String),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, Entry>,
    last_purge: Instant,
}

impl Inner {
    /// Drop every expired key if the purge interval has elapsed.
    fn maybe_purge(&mut self, every: Duration) {
        let now = Instant::now();
        if now.duration_since(self.last_purge) < every {
            return;
        }
        self.entries.retain(|_, e| !e.is_expired(now));
        self.last_purge = now;
    }
}

/// Cache store kept in process memory.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Mutex<Inner>,
    purge_every: Duration,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_purge_interval(DEFAULT_PURGE_INTERVAL)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_purge_interval(purge_every: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                last_purge: Instant::now(),
            }),
            purge_every,
        }
    }

    /// Drop every key, the equivalent of `FLUSHDB`.
    pub async fn flush(&self) {
        self.inner.lock().await.entries.clear();
    }

    /// Remove all expired keys now. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        inner.maybe_purge(Duration::ZERO);
        before - inner.entries.len()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .lock()
            .await
            .entries
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Expiry instant for `ttl` from now; a TTL past the clock's range never expires.
fn deadline(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

/// Look up a live entry, evicting it first if it has expired.
fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    let now = Instant::now();
    if entries.get(key).is_some_and(|e| e.is_expired(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn hash_set(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.maybe_purge(self.purge_every);
        let entries = &mut inner.entries;
        let expires_at = deadline(ttl);
        match live(entries, key) {
            Some(Entry {
                value: Value::Hash(hash),
                expires_at: at,
            }) => {
                for (field, value) in fields {
                    hash.insert((*field).to_string(), value.clone());
                }
                *at = expires_at;
            }
            Some(_) => return Err(StoreError::cache(WrongType(key.to_string()))),
            None => {
                let hash = fields
                    .iter()
                    .map(|(f, v)| ((*f).to_string(), v.clone()))
                    .collect();
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Hash(hash),
                        expires_at,
                    },
                );
            }
        }
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut inner = self.inner.lock().await;
        match live(&mut inner.entries, key) {
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => Ok(hash.clone()),
            Some(_) => Err(StoreError::cache(WrongType(key.to_string()))),
            None => Ok(HashMap::new()),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().await;
        match live(&mut inner.entries, key) {
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => Ok(hash.get(field).cloned()),
            Some(_) => Err(StoreError::cache(WrongType(key.to_string()))),
            None => Ok(None),
        }
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.maybe_purge(self.purge_every);
        let entries = &mut inner.entries;
        if live(entries, key).is_some() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: deadline(ttl),
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().await;
        match live(&mut inner.entries, key) {
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::cache(WrongType(key.to_string()))),
            None => Ok(None),
        }
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let entries = &mut inner.entries;
        let mut removed = 0;
        for key in keys {
            if live(entries, key).is_some() {
                entries.remove(key);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn hash_set_merges_fields() {
        let cache = MemoryCache::new();
        cache
            .hash_set("sid:a", &[("owner_id", "1".into()), ("valid", "1".into())], TTL)
            .await
            .unwrap();
        cache
            .hash_set("sid:a", &[("jti", "j".into())], TTL)
            .await
            .unwrap();

        let all = cache.hash_get_all("sid:a").await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(cache.hash_get("sid:a", "jti").await.unwrap().as_deref(), Some("j"));
    }

    #[tokio::test]
    async fn missing_hash_is_empty_not_error() {
        let cache = MemoryCache::new();
        assert!(cache.hash_get_all("sid:none").await.unwrap().is_empty());
        assert!(cache.hash_get("sid:none", "email").await.unwrap().is_none());
        assert!(cache.get("email:sid:none").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_if_absent_keeps_first_value() {
        let cache = MemoryCache::new();
        assert!(cache.set_if_absent("k", "first", TTL).await.unwrap());
        assert!(!cache.set_if_absent("k", "second", TTL).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new();
        let short = Duration::from_millis(20);
        cache.set_if_absent("k", "v", short).await.unwrap();
        cache.hash_set("h", &[("f", "v".into())], short).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.hash_get_all("h").await.unwrap().is_empty());
        assert!(cache.set_if_absent("k", "again", TTL).await.unwrap());
    }

    #[tokio::test]
    async fn delete_counts_existing_keys() {
        let cache = MemoryCache::new();
        cache.set_if_absent("a", "1", TTL).await.unwrap();
        cache.hash_set("b", &[("f", "v".into())], TTL).await.unwrap();

        let removed = cache
            .delete(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn wrong_type_is_a_fault() {
        let cache = MemoryCache::new();
        cache.set_if_absent("k", "v", TTL).await.unwrap();
        assert_matches!(cache.hash_get_all("k").await, Err(StoreError::Cache(_)));
    }

    #[tokio::test]
    async fn abandoned_keys_are_purged_on_write() {
        let cache = MemoryCache::with_purge_interval(Duration::ZERO);
        let short = Duration::from_millis(1);
        for i in 0..1000 {
            cache
                .hash_set(&format!("sid:{i}"), &[("valid", "1".into())], short)
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache
            .hash_set("sid:new", &[("valid", "1".into())], TTL)
            .await
            .unwrap();

        assert_eq!(cache.inner.lock().await.entries.len(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn purge_waits_for_interval() {
        let cache = MemoryCache::with_purge_interval(Duration::from_secs(3600));
        cache
            .set_if_absent("old", "v", Duration::from_millis(1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.set_if_absent("new", "v", TTL).await.unwrap();

        // Expired but not yet swept.
        assert_eq!(cache.inner.lock().await.entries.len(), 2);
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.inner.lock().await.entries.len(), 1);
    }

    #[tokio::test]
    async fn huge_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache
            .hash_set("sid:a", &[("valid", "1".into())], Duration::MAX)
            .await
            .unwrap();
        assert!(cache.set_if_absent("k", "v", Duration::MAX).await.unwrap());

        assert_eq!(
            cache.hash_get("sid:a", "valid").await.unwrap().as_deref(),
            Some("1")
        );
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
