use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::ApiResponse;

/// Domain error for the credential/token lifecycle core.
///
/// Deliberately transport-free: variants describe what went wrong, and the
/// HTTP boundary maps each kind to a status code via [`status_for`]. Refresh
/// and reset failures share [`AuthError::InvalidOrExpiredToken`] so callers
/// cannot distinguish a wrong token from an expired or replayed one.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("The email has already been taken.")]
    EmailTaken,

    #[error("User not found.")]
    UserNotFound,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Invalid access token.")]
    InvalidToken,

    #[error("Invalid or expired token.")]
    InvalidOrExpiredToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AuthError {
    /// Create a validation error with field-level details.
    pub fn validation_fields(errors: Vec<FieldError>) -> Self {
        AuthError::Validation(errors)
    }
}

/// Field-level validation error.
///
/// ```json
/// {
///   "field": "email",
///   "message": "must be a valid email address"
/// }
/// ```
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Mapping table from error kind to HTTP status.
///
/// Lives at the boundary, not inside the error values: the core produces
/// kinds, the transport decides what they mean on the wire.
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::InvalidOrExpiredToken => StatusCode::UNAUTHORIZED,
        AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for(&self);

        let (message, errors) = match &self {
            AuthError::Validation(fields) => (
                "Validation failed".to_string(),
                Some(serde_json::json!(fields)),
            ),
            // Storage details stay in the logs, not on the wire.
            AuthError::Database(e) => {
                tracing::error!(error = %e, "database error reached the HTTP boundary");
                ("An unexpected error occurred.".to_string(), None)
            }
            AuthError::Internal(e) => {
                tracing::error!(error = %e, "internal error reached the HTTP boundary");
                ("An unexpected error occurred.".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body: ApiResponse<()> = ApiResponse::failure(message, errors);
        (status, axum::Json(body)).into_response()
    }
}
