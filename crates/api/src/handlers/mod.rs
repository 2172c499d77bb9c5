pub mod auth;
pub mod owner;
