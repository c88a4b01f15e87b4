use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Standard API response wrapper.
///
/// All Warden endpoints return this format:
/// ```json
/// {
///   "status": true,
///   "message": "Login successful",
///   "data": { ... },
///   "errors": null
/// }
/// ```
///
/// `data` and `errors` are always present (null when absent) so clients can
/// destructure the envelope without key checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<serde_json::Value>,
    #[serde(skip)]
    #[schema(ignore)]
    code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with data (200).
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            code: StatusCode::OK,
        }
    }

    /// Successful response for a newly created resource (201).
    pub fn created(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            code: StatusCode::CREATED,
        }
    }

    /// Failure envelope. The HTTP status is supplied by the error mapping
    /// at the boundary, not stored here.
    pub fn failure(message: impl Into<String>, errors: Option<serde_json::Value>) -> Self {
        ApiResponse {
            status: false,
            message: message.into(),
            data: None,
            errors,
            code: StatusCode::BAD_REQUEST,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with no data payload.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            status: true,
            message: message.into(),
            data: None,
            errors: None,
            code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let code = self.code;
        (code, axum::Json(self)).into_response()
    }
}
