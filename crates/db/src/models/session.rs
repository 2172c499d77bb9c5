//! Login session row from the `auth` table.

use catering_core::session::StoredSession;
use catering_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AuthSessionRow {
    pub sid: String,
    pub owner_id: DbId,
    pub email: String,
    pub refresh_token: String,
    pub jti: String,
    pub expired_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AuthSessionRow> for StoredSession {
    fn from(row: AuthSessionRow) -> Self {
        Self {
            sid: row.sid,
            owner_id: row.owner_id,
            email: row.email,
            jti: row.jti,
            refresh_token: row.refresh_token,
            expired_at: row.expired_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
