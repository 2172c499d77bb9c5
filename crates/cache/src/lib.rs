//! Cache store implementations for the session protocol.
//!
//! - [`RedisCache`] -- production store over a Redis `ConnectionManager`.
//! - [`MemoryCache`] -- in-process TTL map for local development and tests.

pub mod memory;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::{RedisCache, RedisConfig};
