#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required param: {0}")]
    Required(&'static str),

    #[error("Validation failed: {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
