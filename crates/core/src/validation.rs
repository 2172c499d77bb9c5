//! Request field validation shared by the auth operations.
//!
//! Required-field checks run first so callers can tell a missing field
//! ([`CoreError::Required`]) from a malformed one ([`CoreError::Validation`]).

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length accepted for login, logout and reset requests.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reject an empty (or whitespace-only) required field.
pub fn require(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Required(field));
    }
    Ok(())
}

/// Validate that `email` is a syntactically valid address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation {
            field: "email",
            reason: "must be a valid email address".into(),
        });
    }
    Ok(())
}

/// Validate password format: ASCII alphanumeric, at least [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(field: &'static str, password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation {
            field,
            reason: format!("must be at least {MIN_PASSWORD_LENGTH} characters long"),
        });
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::Validation {
            field,
            reason: "must contain only letters and digits".into(),
        });
    }
    Ok(())
}
