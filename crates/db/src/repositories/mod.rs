//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod owner_repo;
pub mod session_repo;

pub use owner_repo::OwnerRepo;
pub use session_repo::SessionRepo;
