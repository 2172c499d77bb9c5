//! Owner entity row.

use catering_core::owner::Owner;
use catering_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full owner row from the `owners` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
#[derive(Debug, Clone, FromRow)]
pub struct OwnerRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub password: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an owner (registration itself lives outside this service).
#[derive(Debug)]
pub struct CreateOwner {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password,
        }
    }
}
