use utoipa::OpenApi;

use crate::controllers::auth::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, ResetPasswordRequest,
};
use crate::controllers::users::{ChangePasswordRequest, UserListResponse};
use crate::models::user::UserResponse;

/// Auto-generated OpenAPI documentation for Warden.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warden API",
        version = "0.1.0",
        description = "Warden: minimal authentication and user-profile service."
    ),
    paths(
        crate::controllers::auth::register,
        crate::controllers::auth::login,
        crate::controllers::auth::logout,
        crate::controllers::auth::refresh,
        crate::controllers::auth::forgot_password,
        crate::controllers::auth::reset_password,
        crate::controllers::users::me,
        crate::controllers::users::show,
        crate::controllers::users::index,
        crate::controllers::users::change_password,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            RefreshRequest,
            RefreshResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ChangePasswordRequest,
            UserListResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "user", description = "User profile endpoints")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
