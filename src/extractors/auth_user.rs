use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth;
use crate::controllers::AppState;
use crate::error::AuthError;

/// Extractor that resolves the bearer token and provides the authenticated
/// principal explicitly — no handler reads ambient auth state.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(principal: AuthUser) -> impl IntoResponse {
///     // principal.user_id is the authenticated user's ID
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    /// Id of the access token that authenticated this request, so
    /// operations like change-password can spare the session that made them.
    pub token_id: i32,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AuthError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let (user_id, token_id) = auth::access::authenticate(&state.db, token).await?;

        Ok(AuthUser { user_id, token_id })
    }
}
