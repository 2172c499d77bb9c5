//! Repository for the `auth` (login session) table.

use catering_core::session::SessionRecord;
use sqlx::PgPool;

use crate::models::session::AuthSessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "sid, owner_id, email, refresh_token, jti, expired_at, created_at, updated_at";

/// Provides insert / lookup / delete for session rows keyed by `sid`.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session row, returning it.
    ///
    /// A duplicate `sid` violates the primary key and surfaces as a
    /// database error.
    pub async fn create(
        pool: &PgPool,
        input: &SessionRecord,
    ) -> Result<AuthSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO auth (sid, owner_id, email, refresh_token, jti, expired_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthSessionRow>(&query)
            .bind(&input.sid)
            .bind(input.owner_id)
            .bind(&input.email)
            .bind(&input.refresh_token)
            .bind(&input.jti)
            .bind(input.expired_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session row by its id, regardless of expiry.
    pub async fn find_by_sid(
        pool: &PgPool,
        sid: &str,
    ) -> Result<Option<AuthSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM auth WHERE sid = $1");
        sqlx::query_as::<_, AuthSessionRow>(&query)
            .bind(sid)
            .fetch_optional(pool)
            .await
    }

    /// Delete a session row. Returns the number of affected rows.
    pub async fn delete(pool: &PgPool, sid: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth WHERE sid = $1")
            .bind(sid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete rows whose refresh window has closed. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth WHERE expired_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
