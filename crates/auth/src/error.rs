use catering_core::error::CoreError;
use catering_core::store::StoreError;

use crate::mailer::MailError;
use crate::password::PasswordError;
use crate::token::TokenError;

/// Caller-visible category of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field is missing.
    RequiredField,
    /// A field is present but malformed.
    InvalidField,
    Auth,
    NotFound,
    Internal,
}

/// Error type of the auth core.
///
/// Every variant maps to an [`ErrorKind`] and a fixed public message. The
/// `Display` output and the source chain carry the internal cause and are
/// meant for logs only.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing required param: {field}")]
    Required { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("unauthorized: {cause}")]
    Unauthorized { cause: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("token error: {0}")]
    Token(#[source] TokenError),

    #[error("password error: {0}")]
    Password(#[source] PasswordError),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn unauthorized(cause: impl Into<String>) -> Self {
        Self::Unauthorized {
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Required { .. } => ErrorKind::RequiredField,
            Self::Validation { .. } => ErrorKind::InvalidField,
            Self::Unauthorized { .. } => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Store(_)
            | Self::Token(_)
            | Self::Password(_)
            | Self::Mail(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to return to callers.
    pub fn public_message(&self) -> String {
        match self {
            Self::Required { field } => format!("missing required param: {field}"),
            Self::Validation { field, reason } => format!("invalid {field}: {reason}"),
            Self::Unauthorized { .. } => "unauthorized".to_string(),
            Self::NotFound { entity } => format!("{entity} not found"),
            _ => "internal server error".to_string(),
        }
    }
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Required(field) => Self::Required { field },
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::NotFound { entity, .. } => Self::NotFound { entity },
            CoreError::Unauthorized(cause) => Self::Unauthorized { cause },
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}
