use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catering_auth::{AuthError, ErrorKind};
use catering_core::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`AuthError`] and adds request-decoding failures. Implements
/// [`IntoResponse`] to produce `{"error": message, "code": CODE}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Auth(AuthError::Store(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Auth(err) => match err.kind() {
                ErrorKind::RequiredField => {
                    (StatusCode::BAD_REQUEST, "REQUIRED_FIELD", err.public_message())
                }
                ErrorKind::InvalidField => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    err.public_message(),
                ),
                ErrorKind::Auth => {
                    tracing::warn!(error = %err, "Request rejected");
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.public_message())
                }
                ErrorKind::NotFound => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.public_message())
                }
                ErrorKind::Internal => {
                    tracing::error!(error = %err, "Internal auth error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
