//! Owner account as seen by the auth core.

use crate::types::DbId;

/// An owner row, reduced to the columns authentication needs.
///
/// Carries the stored password hash -- never serialize this to responses.
#[derive(Debug, Clone)]
pub struct Owner {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
