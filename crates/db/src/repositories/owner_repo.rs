//! Repository for the `owners` table.

use catering_core::types::DbId;
use sqlx::PgPool;

use crate::models::owner::{CreateOwner, OwnerRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, phone_number, date_of_birth, password, created_at, updated_at";

/// Owner lookups and password updates used by authentication.
pub struct OwnerRepo;

impl OwnerRepo {
    /// Insert a new owner, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateOwner) -> Result<OwnerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO owners (name, email, phone_number, password)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OwnerRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find an owner by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OwnerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM owners WHERE id = $1");
        sqlx::query_as::<_, OwnerRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an owner by email (case-sensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<OwnerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM owners WHERE email = $1");
        sqlx::query_as::<_, OwnerRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replace the password hash for the owner with `email`.
    ///
    /// Returns `true` if a row was updated.
    pub async fn update_password_by_email(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE owners SET password = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
