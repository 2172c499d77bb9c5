//! Session persistence across the durable record store and the cache.
//!
//! Writes go to the durable store first and then to the cache; reads go to the
//! cache first and fall back to the durable store, writing live rows back
//! into the cache. There is no cross-store transaction: a failure after the
//! durable write leaves the durable row in place.
//!
//! Cache layout:
//!
//! | Key                  | Type   | Content                                   |
//! |----------------------|--------|-------------------------------------------|
//! | `sid:{sid}`          | hash   | `owner_id`, `valid` (`1`/`0`), `jti`, `email` |
//! | `email:sid:{email}`  | string | the owner's live `sid`                    |
//!
//! Both keys expire with the refresh-token lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catering_core::session::{NewSession, Session, SessionRecord};
use catering_core::store::{CacheStore, SessionRecordStore, StoreError};
use catering_core::types::DbId;
use chrono::Utc;

const FIELD_OWNER_ID: &str = "owner_id";
const FIELD_VALID: &str = "valid";
const FIELD_JTI: &str = "jti";
const FIELD_EMAIL: &str = "email";

fn session_key(sid: &str) -> String {
    format!("sid:{sid}")
}

fn email_index_key(email: &str) -> String {
    format!("email:sid:{email}")
}

/// Raised when a cached session hash cannot be decoded.
#[derive(Debug, thiserror::Error)]
#[error("malformed cached session {key}: {reason}")]
pub struct MalformedSession {
    key: String,
    reason: String,
}

/// Session lifecycle operations used by the auth service.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session durably, then cache it and index it by email.
    async fn create_session(&self, new: NewSession) -> Result<(), StoreError>;

    async fn get_session(&self, sid: &str) -> Result<Option<Session>, StoreError>;

    /// Delete the durable row, then the cached hash and email index.
    ///
    /// [`StoreError::NoRowsAffected`] when no durable row existed.
    async fn delete_session(&self, sid: &str) -> Result<(), StoreError>;

    /// The live `sid` indexed for `email`. Cache only.
    async fn session_id_by_email(&self, email: &str) -> Result<Option<String>, StoreError>;

    /// Delete durable rows whose refresh window has closed.
    async fn sweep_expired(&self) -> Result<u64, StoreError>;

    fn access_token_ttl(&self) -> Duration;

    fn refresh_token_ttl(&self) -> Duration;
}

/// [`SessionStore`] over a [`SessionRecordStore`] and a [`CacheStore`].
#[derive(Clone)]
pub struct SessionStoreAdapter {
    records: Arc<dyn SessionRecordStore>,
    cache: Arc<dyn CacheStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionStoreAdapter {
    pub fn new(
        records: Arc<dyn SessionRecordStore>,
        cache: Arc<dyn CacheStore>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            records,
            cache,
            access_ttl,
            refresh_ttl,
        }
    }

    async fn cache_session(&self, session: &Session, ttl: Duration) -> Result<(), StoreError> {
        let fields = [
            (FIELD_OWNER_ID, session.owner_id.to_string()),
            (FIELD_VALID, (if session.valid { "1" } else { "0" }).to_string()),
            (FIELD_JTI, session.jti.clone()),
            (FIELD_EMAIL, session.email.clone()),
        ];
        self.cache
            .hash_set(&session_key(&session.sid), &fields, ttl)
            .await?;
        self.cache
            .set_if_absent(&email_index_key(&session.email), &session.sid, ttl)
            .await?;
        Ok(())
    }
}

fn session_from_hash(
    sid: &str,
    mut fields: HashMap<String, String>,
) -> Result<Session, StoreError> {
    let malformed = |reason: String| {
        StoreError::cache(MalformedSession {
            key: session_key(sid),
            reason,
        })
    };

    let owner_id = fields
        .get(FIELD_OWNER_ID)
        .ok_or_else(|| malformed("missing owner_id".into()))?
        .parse::<DbId>()
        .map_err(|e| malformed(format!("owner_id: {e}")))?;
    let valid = matches!(fields.get(FIELD_VALID).map(String::as_str), Some("1" | "true"));

    Ok(Session {
        sid: sid.to_string(),
        owner_id,
        email: fields.remove(FIELD_EMAIL).unwrap_or_default(),
        jti: fields.remove(FIELD_JTI).unwrap_or_default(),
        refresh_token: String::new(),
        valid,
        expired_at: None,
        created_at: None,
        updated_at: None,
    })
}

fn chrono_window(ttl: Duration) -> chrono::Duration {
    // Out-of-range TTLs saturate at a century.
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52 * 100))
}

#[async_trait]
impl SessionStore for SessionStoreAdapter {
    async fn create_session(&self, new: NewSession) -> Result<(), StoreError> {
        let expired_at = Utc::now() + chrono_window(self.refresh_ttl);
        self.records
            .insert(&SessionRecord::from_new(&new, expired_at))
            .await?;

        let session = Session {
            sid: new.sid,
            owner_id: new.owner_id,
            email: new.email,
            jti: new.jti,
            refresh_token: String::new(),
            valid: true,
            expired_at: Some(expired_at),
            created_at: None,
            updated_at: None,
        };
        self.cache_session(&session, self.refresh_ttl).await?;

        tracing::info!(sid = %session.sid, owner_id = session.owner_id, "Session created");
        Ok(())
    }

    async fn get_session(&self, sid: &str) -> Result<Option<Session>, StoreError> {
        let fields = self.cache.hash_get_all(&session_key(sid)).await?;
        if !fields.is_empty() {
            return session_from_hash(sid, fields).map(Some);
        }

        tracing::debug!(sid, "Session cache miss, reading durable store");
        let Some(row) = self.records.find_by_sid(sid).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let remaining = (row.expired_at - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
            .min(self.refresh_ttl);
        let session = row.into_session(now);

        // Expired rows are returned as invalid but never re-cached.
        if session.valid && !remaining.is_zero() {
            self.cache_session(&session, remaining).await?;
        }
        Ok(Some(session))
    }

    async fn delete_session(&self, sid: &str) -> Result<(), StoreError> {
        let affected = self.records.delete_by_sid(sid).await?;
        if affected == 0 {
            return Err(StoreError::NoRowsAffected {
                sid: sid.to_string(),
            });
        }

        let key = session_key(sid);
        let email = self.cache.hash_get(&key, FIELD_EMAIL).await?;
        let mut keys = vec![key];
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            keys.push(email_index_key(&email));
        }
        self.cache.delete(&keys).await?;

        tracing::info!(sid, "Session deleted");
        Ok(())
    }

    async fn session_id_by_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        self.cache.get(&email_index_key(email)).await
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let removed = self.records.delete_expired().await?;
        if removed > 0 {
            tracing::info!(removed, "Expired sessions swept");
        }
        Ok(removed)
    }

    fn access_token_ttl(&self) -> Duration {
        self.access_ttl
    }

    fn refresh_token_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailOnDelete, FailingCache, InMemorySessionRecords};
    use assert_matches::assert_matches;
    use catering_cache::MemoryCache;
    use catering_core::session::StoredSession;

    const ACCESS_TTL: Duration = Duration::from_secs(900);
    const REFRESH_TTL: Duration = Duration::from_secs(3600);

    struct Fixture {
        records: Arc<InMemorySessionRecords>,
        cache: Arc<MemoryCache>,
        store: SessionStoreAdapter,
    }

    fn fixture() -> Fixture {
        let records = Arc::new(InMemorySessionRecords::new());
        let cache = Arc::new(MemoryCache::new());
        let store = SessionStoreAdapter::new(
            records.clone(),
            cache.clone(),
            ACCESS_TTL,
            REFRESH_TTL,
        );
        Fixture {
            records,
            cache,
            store,
        }
    }

    fn new_session(sid: &str) -> NewSession {
        NewSession {
            sid: sid.into(),
            owner_id: 1,
            email: "test@example.com".into(),
            jti: format!("jti-{sid}"),
            refresh_token: "refresh".into(),
        }
    }

    fn stored(sid: &str, expired_at: chrono::DateTime<Utc>) -> StoredSession {
        let now = Utc::now();
        StoredSession {
            sid: sid.into(),
            owner_id: 9,
            email: "durable@example.com".into(),
            jti: "jti-durable".into(),
            refresh_token: "refresh".into(),
            expired_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn created_session_is_served_from_cache() {
        let f = fixture();
        f.store.create_session(new_session("s1")).await.unwrap();

        let session = f.store.get_session("s1").await.unwrap().expect("session exists");
        assert_eq!(session.owner_id, 1);
        assert_eq!(session.jti, "jti-s1");
        assert_eq!(session.email, "test@example.com");
        assert!(session.valid);
        assert!(session.refresh_token.is_empty(), "refresh token is never cached");
        assert_eq!(f.records.find_count(), 0);
        assert!(f.records.contains("s1"));
    }

    #[tokio::test]
    async fn email_index_points_at_sid() {
        let f = fixture();
        f.store.create_session(new_session("s1")).await.unwrap();

        assert_eq!(
            f.store.session_id_by_email("test@example.com").await.unwrap(),
            Some("s1".to_string())
        );
        assert_eq!(f.store.session_id_by_email("other@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_session_keeps_first_email_index() {
        let f = fixture();
        f.store.create_session(new_session("s1")).await.unwrap();
        f.store.create_session(new_session("s2")).await.unwrap();

        assert_eq!(
            f.store.session_id_by_email("test@example.com").await.unwrap().as_deref(),
            Some("s1")
        );
    }

    #[tokio::test]
    async fn durable_hit_repopulates_cache() {
        let f = fixture();
        f.records.seed(stored("s1", Utc::now() + chrono::Duration::minutes(30)));

        let first = f.store.get_session("s1").await.unwrap().expect("durable row");
        assert!(first.valid);
        assert_eq!(first.refresh_token, "refresh");
        assert!(first.expired_at.is_some());
        assert_eq!(f.records.find_count(), 1);

        let second = f.store.get_session("s1").await.unwrap().expect("cached row");
        assert_eq!(second.owner_id, 9);
        assert_eq!(second.jti, "jti-durable");
        assert!(second.valid);
        assert_eq!(f.records.find_count(), 1, "second lookup must not hit the durable store");

        assert_eq!(
            f.store.session_id_by_email("durable@example.com").await.unwrap().as_deref(),
            Some("s1")
        );
    }

    #[tokio::test]
    async fn expired_durable_row_is_invalid_and_not_cached() {
        let f = fixture();
        f.records.seed(stored("s1", Utc::now() - chrono::Duration::seconds(5)));

        let session = f.store.get_session("s1").await.unwrap().expect("durable row");
        assert!(!session.valid);
        assert!(f.cache.is_empty().await);

        f.store.get_session("s1").await.unwrap();
        assert_eq!(f.records.find_count(), 2);
    }

    #[tokio::test]
    async fn unknown_sid_is_none() {
        let f = fixture();
        assert_matches!(f.store.get_session("nope").await, Ok(None));
        assert_eq!(f.records.find_count(), 1);
    }

    #[tokio::test]
    async fn durable_fault_is_distinct_from_absence() {
        let f = fixture();
        f.records.set_failing(true);
        assert_matches!(f.store.get_session("s1").await, Err(StoreError::Durable(_)));
    }

    #[tokio::test]
    async fn malformed_cache_hash_is_a_cache_error() {
        let f = fixture();
        f.cache
            .hash_set("sid:s1", &[(FIELD_OWNER_ID, "abc".to_string())], REFRESH_TTL)
            .await
            .unwrap();
        assert_matches!(f.store.get_session("s1").await, Err(StoreError::Cache(_)));
    }

    #[tokio::test]
    async fn delete_removes_row_hash_and_index() {
        let f = fixture();
        f.store.create_session(new_session("s1")).await.unwrap();

        f.store.delete_session("s1").await.unwrap();

        assert!(!f.records.contains("s1"));
        assert!(f.cache.is_empty().await);
        assert_matches!(f.store.get_session("s1").await, Ok(None));
        assert_eq!(f.store.session_id_by_email("test@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_of_missing_row_errors() {
        let f = fixture();
        assert_matches!(
            f.store.delete_session("ghost").await,
            Err(StoreError::NoRowsAffected { sid }) if sid == "ghost"
        );
    }

    #[tokio::test]
    async fn durable_delete_failure_leaves_cache() {
        let f = fixture();
        f.store.create_session(new_session("s1")).await.unwrap();
        f.records.set_failing(true);

        assert_matches!(f.store.delete_session("s1").await, Err(StoreError::Durable(_)));
        assert_eq!(f.cache.len().await, 2);
    }

    #[tokio::test]
    async fn cache_delete_failure_surfaces_after_durable_delete() {
        let records = Arc::new(InMemorySessionRecords::new());
        let cache = Arc::new(FailOnDelete(MemoryCache::new()));
        let store = SessionStoreAdapter::new(
            records.clone(),
            cache.clone(),
            ACCESS_TTL,
            REFRESH_TTL,
        );
        store.create_session(new_session("s1")).await.unwrap();

        assert_matches!(store.delete_session("s1").await, Err(StoreError::Cache(_)));
        // The durable delete is not rolled back.
        assert!(!records.contains("s1"));
        assert_eq!(cache.0.len().await, 2);
    }

    #[tokio::test]
    async fn duplicate_sid_is_rejected_by_durable_store() {
        let f = fixture();
        f.store.create_session(new_session("s1")).await.unwrap();
        assert_matches!(
            f.store.create_session(new_session("s1")).await,
            Err(StoreError::Durable(_))
        );
    }

    #[tokio::test]
    async fn cache_failure_keeps_durable_row() {
        let records = Arc::new(InMemorySessionRecords::new());
        let store = SessionStoreAdapter::new(
            records.clone(),
            Arc::new(FailingCache),
            ACCESS_TTL,
            REFRESH_TTL,
        );

        assert_matches!(
            store.create_session(new_session("s1")).await,
            Err(StoreError::Cache(_))
        );
        assert!(records.contains("s1"));
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_rows() {
        let f = fixture();
        f.records.seed(stored("old", Utc::now() - chrono::Duration::hours(1)));
        f.records.seed(stored("live", Utc::now() + chrono::Duration::hours(1)));

        assert_eq!(f.store.sweep_expired().await.unwrap(), 1);
        assert!(f.records.contains("live"));
        assert!(!f.records.contains("old"));
    }

    #[test]
    fn ttls_are_exposed() {
        let f = fixture();
        assert_eq!(f.store.access_token_ttl(), ACCESS_TTL);
        assert_eq!(f.store.refresh_token_ttl(), REFRESH_TTL);
    }
}
