//! Login session entity shared by the durable store, the cache and the auth core.

use crate::types::{DbId, Timestamp};

/// A login session.
///
/// Sessions served from the cache carry only the hashed fields (`owner_id`,
/// `valid`, `jti`, `email`); `refresh_token` is empty and the timestamps are
/// `None` in that case. Sessions loaded from the durable store carry every
/// column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub sid: String,
    pub owner_id: DbId,
    pub email: String,
    pub jti: String,
    pub refresh_token: String,
    pub valid: bool,
    pub expired_at: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Input for establishing a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub sid: String,
    pub owner_id: DbId,
    pub email: String,
    pub jti: String,
    pub refresh_token: String,
}

/// A durable `auth` row about to be inserted.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub sid: String,
    pub owner_id: DbId,
    pub email: String,
    pub jti: String,
    pub refresh_token: String,
    pub expired_at: Timestamp,
}

impl SessionRecord {
    /// Build the durable record for `new`, expiring at `expired_at`.
    pub fn from_new(new: &NewSession, expired_at: Timestamp) -> Self {
        Self {
            sid: new.sid.clone(),
            owner_id: new.owner_id,
            email: new.email.clone(),
            jti: new.jti.clone(),
            refresh_token: new.refresh_token.clone(),
            expired_at,
        }
    }
}

/// A durable `auth` row as read back from the record store.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub sid: String,
    pub owner_id: DbId,
    pub email: String,
    pub jti: String,
    pub refresh_token: String,
    pub expired_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StoredSession {
    /// Whether the refresh window of this row is still open at `now`.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        self.expired_at > now
    }

    /// Convert into a [`Session`], marking it valid while the refresh window is open.
    pub fn into_session(self, now: Timestamp) -> Session {
        let valid = self.is_live_at(now);
        Session {
            sid: self.sid,
            owner_id: self.owner_id,
            email: self.email,
            jti: self.jti,
            refresh_token: self.refresh_token,
            valid,
            expired_at: Some(self.expired_at),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn stored(expired_at: Timestamp) -> StoredSession {
        let now = Utc::now();
        StoredSession {
            sid: "sid-1".into(),
            owner_id: 7,
            email: "owner@example.com".into(),
            jti: "jti-1".into(),
            refresh_token: "rt".into(),
            expired_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn live_row_converts_to_valid_session() {
        let now = Utc::now();
        let session = stored(now + Duration::hours(1)).into_session(now);
        assert!(session.valid);
        assert_eq!(session.sid, "sid-1");
        assert_eq!(session.refresh_token, "rt");
        assert!(session.expired_at.is_some());
    }

    #[test]
    fn expired_row_converts_to_invalid_session() {
        let now = Utc::now();
        let session = stored(now - Duration::seconds(1)).into_session(now);
        assert!(!session.valid);
    }
}
