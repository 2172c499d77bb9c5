//! [`catering_core::store`] implementations backed by the repositories.

use async_trait::async_trait;
use catering_core::owner::Owner;
use catering_core::session::{SessionRecord, StoredSession};
use catering_core::store::{OwnerStore, SessionRecordStore, StoreError};
use catering_core::types::DbId;

use crate::repositories::{OwnerRepo, SessionRepo};
use crate::DbPool;

/// Owner store over the `owners` table.
#[derive(Clone)]
pub struct PgOwnerStore {
    pool: DbPool,
}

impl PgOwnerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerStore for PgOwnerStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>, StoreError> {
        let row = OwnerRepo::find_by_email(&self.pool, email)
            .await
            .map_err(StoreError::durable)?;
        Ok(row.map(Owner::from))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Owner>, StoreError> {
        let row = OwnerRepo::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::durable)?;
        Ok(row.map(Owner::from))
    }

    async fn update_password_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        OwnerRepo::update_password_by_email(&self.pool, email, password_hash)
            .await
            .map_err(StoreError::durable)
    }
}

/// Durable session store over the `auth` table.
#[derive(Clone)]
pub struct PgSessionRecordStore {
    pool: DbPool,
}

impl PgSessionRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRecordStore for PgSessionRecordStore {
    async fn insert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let row = SessionRepo::create(&self.pool, record)
            .await
            .map_err(StoreError::durable)?;
        tracing::debug!(sid = %row.sid, owner_id = row.owner_id, "Session row inserted");
        Ok(())
    }

    async fn find_by_sid(&self, sid: &str) -> Result<Option<StoredSession>, StoreError> {
        let row = SessionRepo::find_by_sid(&self.pool, sid)
            .await
            .map_err(StoreError::durable)?;
        Ok(row.map(StoredSession::from))
    }

    async fn delete_by_sid(&self, sid: &str) -> Result<u64, StoreError> {
        SessionRepo::delete(&self.pool, sid)
            .await
            .map_err(StoreError::durable)
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        SessionRepo::cleanup_expired(&self.pool)
            .await
            .map_err(StoreError::durable)
    }
}
