//! In-memory collaborators with call counters, for tests of the auth core and
//! the crates built on it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use catering_core::owner::Owner;
use catering_core::session::{SessionRecord, StoredSession};
use catering_core::store::{CacheStore, OwnerStore, SessionRecordStore, StoreError};
use catering_core::types::DbId;

use crate::config::PasswordCost;
use crate::mailer::{MailError, Mailer};
use crate::password::{Argon2Hasher, PasswordHasher};

fn unavailable(what: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, format!("{what} unavailable"))
}

/// An [`Argon2Hasher`] with the cheapest accepted cost, so tests stay fast.
pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::new(PasswordCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("minimal argon2 params are valid")
}

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryOwners {
    owners: Mutex<Vec<Owner>>,
    pub password_updates: AtomicUsize,
}

impl InMemoryOwners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an owner whose password is `password`, hashed with [`fast_hasher`].
    pub fn with_owner(self, id: DbId, name: &str, email: &str, password: &str) -> Self {
        let password_hash = fast_hasher().hash(password).expect("hashing should succeed");
        self.owners.lock().unwrap().push(Owner {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        });
        self
    }

    pub fn password_hash_of(&self, email: &str) -> Option<String> {
        self.owners
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.email == email)
            .map(|o| o.password_hash.clone())
    }
}

#[async_trait]
impl OwnerStore for InMemoryOwners {
    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>, StoreError> {
        Ok(self.owners.lock().unwrap().iter().find(|o| o.email == email).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Owner>, StoreError> {
        Ok(self.owners.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn update_password_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        self.password_updates.fetch_add(1, Ordering::SeqCst);
        let mut owners = self.owners.lock().unwrap();
        match owners.iter_mut().find(|o| o.email == email) {
            Some(owner) => {
                owner.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Session records
// ---------------------------------------------------------------------------

/// Durable session store kept in memory.
///
/// Counters record every call; [`set_failing`](Self::set_failing) turns every
/// subsequent call into a [`StoreError::Durable`].
#[derive(Debug, Default)]
pub struct InMemorySessionRecords {
    rows: Mutex<HashMap<String, StoredSession>>,
    failing: AtomicBool,
    pub inserts: AtomicUsize,
    pub finds: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl InMemorySessionRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Put a row in place without going through [`SessionRecordStore::insert`].
    pub fn seed(&self, row: StoredSession) {
        self.rows.lock().unwrap().insert(row.sid.clone(), row);
    }

    pub fn contains(&self, sid: &str) -> bool {
        self.rows.lock().unwrap().contains_key(sid)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::durable(unavailable("record store")));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRecordStore for InMemorySessionRecords {
    async fn insert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&record.sid) {
            return Err(StoreError::durable(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("duplicate sid {}", record.sid),
            )));
        }
        let now = chrono::Utc::now();
        rows.insert(
            record.sid.clone(),
            StoredSession {
                sid: record.sid.clone(),
                owner_id: record.owner_id,
                email: record.email.clone(),
                jti: record.jti.clone(),
                refresh_token: record.refresh_token.clone(),
                expired_at: record.expired_at,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn find_by_sid(&self, sid: &str) -> Result<Option<StoredSession>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.rows.lock().unwrap().get(sid).cloned())
    }

    async fn delete_by_sid(&self, sid: &str) -> Result<u64, StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(u64::from(self.rows.lock().unwrap().remove(sid).is_some()))
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        self.check()?;
        let now = chrono::Utc::now();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, row| row.is_live_at(now));
        Ok((before - rows.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Cache store whose every call fails with [`StoreError::Cache`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn hash_set(
        &self,
        _key: &str,
        _fields: &[(&str, String)],
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }

    async fn hash_get_all(&self, _key: &str) -> Result<HashMap<String, String>, StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }

    async fn hash_get(&self, _key: &str, _field: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }

    async fn set_if_absent(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }

    async fn delete(&self, _keys: &[String]) -> Result<u64, StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }
}

/// Wraps a cache store and fails only its `delete` calls.
#[derive(Debug, Default)]
pub struct FailOnDelete<C>(pub C);

#[async_trait]
impl<C: CacheStore> CacheStore for FailOnDelete<C> {
    async fn hash_set(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.0.hash_set(key, fields, ttl).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.0.hash_get_all(key).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.0.hash_get(key, field).await
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.0.set_if_absent(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key).await
    }

    async fn delete(&self, _keys: &[String]) -> Result<u64, StoreError> {
        Err(StoreError::cache(unavailable("cache")))
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub link: String,
    pub owner_name: String,
}

/// Mailer that keeps every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(
        &self,
        to: &str,
        link: &str,
        owner_name: &str,
    ) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            link: link.to_string(),
            owner_name: owner_name.to_string(),
        });
        Ok(())
    }
}
