use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::{AuthError, FieldError};

/// JSON extractor that maps body errors into the uniform envelope.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn login(Json(payload): Json<LoginRequest>) -> impl IntoResponse {
///     // payload is deserialized from request body
/// }
/// ```
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| {
                AuthError::Validation(vec![FieldError::new(
                    "body",
                    format!("Failed to read body: {}", e),
                )])
            })?;

        let value: T = serde_json::from_slice(&bytes).map_err(|e| {
            AuthError::Validation(vec![FieldError::new("body", format!("Invalid JSON: {}", e))])
        })?;

        Ok(Json(value))
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let bytes = serde_json::to_vec(&self.0).unwrap_or_default();
        (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response()
    }
}
