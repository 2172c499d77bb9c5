//! Row structs for the `owners` and `auth` tables.
//!
//! Each row converts into the matching `catering_core` entity so callers
//! above the record store never see sqlx types.

pub mod owner;
pub mod session;
