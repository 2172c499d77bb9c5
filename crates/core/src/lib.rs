//! Shared domain types for the catering backend.
//!
//! This crate has no internal dependencies so the record store, the cache
//! store and the auth core can all agree on the same session and owner shapes
//! and on the narrow store interfaces in [`store`].

pub mod error;
pub mod owner;
pub mod session;
pub mod store;
pub mod types;
pub mod validation;
