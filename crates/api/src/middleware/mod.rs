//! Request extractors.
//!
//! - [`auth::SessionAuth`] -- `sid` cookie, bearer token and the resolved session.
//! - [`auth::ResetAuth`] -- bearer token or `rpt` cookie for password resets.

pub mod auth;
