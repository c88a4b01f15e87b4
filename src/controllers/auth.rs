use axum::{extract::State, routing::post, Router};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, hash_password, verify_password};
use crate::error::{AuthError, FieldError};
use crate::extractors::{AuthUser, Json};
use crate::models::user::{self, Entity as User, UserResponse};
use crate::response::ApiResponse;

use super::{check_password_pair, is_valid_email, normalize_email, with_retry, AppState};

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Opaque bearer access token (returned exactly once)
    pub token: String,
    /// Opaque refresh token, rotated on every use
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

// ── Handlers ──

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already taken")
    ),
    tag = "auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<UserResponse>, AuthError> {
    let email = normalize_email(&payload.email);

    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if payload.name.len() > 255 {
        errors.push(FieldError::new("name", "Name may not exceed 255 characters"));
    }
    if !is_valid_email(&email) || email.len() > 255 {
        errors.push(FieldError::new("email", "A valid email address is required"));
    }
    check_password_pair(
        &payload.password,
        &payload.password_confirmation,
        state.config.auth.min_password_length,
        &mut errors,
    );
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    // Pre-check for a friendly error; the unique index closes the race.
    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now().naive_utc();

    let new_user = user::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        avatar: Set(None),
        description: Set(None),
        refresh_token: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user_model = match new_user.insert(&state.db).await {
        Ok(u) => u,
        Err(e) => {
            return Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::EmailTaken,
                _ => AuthError::Database(e),
            })
        }
    };

    tracing::info!(user_id = user_model.id, "user registered");

    Ok(ApiResponse::created(
        "User registered successfully",
        UserResponse::from(user_model),
    ))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AuthError> {
    let email = normalize_email(&payload.email);

    let user_model = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !verify_password(&payload.password, &user_model.password_hash) {
        tracing::info!(user_id = user_model.id, "login rejected: bad password");
        return Err(AuthError::InvalidCredentials);
    }

    let (token, _token_id) = auth::access::mint(&state.db, user_model.id).await?;
    let refresh_token = auth::refresh::issue(&state.db, user_model.id).await?;

    tracing::info!(user_id = user_model.id, "login successful");

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse {
            user: UserResponse::from(user_model),
            token,
            refresh_token,
        },
    ))
}

/// Log out: revoke every access token and clear the refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    principal: AuthUser,
) -> Result<ApiResponse<()>, AuthError> {
    auth::access::revoke_all(&state.db, principal.user_id).await?;
    auth::refresh::clear(&state.db, principal.user_id).await?;

    tracing::info!(user_id = principal.user_id, "logout: all sessions revoked");

    Ok(ApiResponse::message("Logout successful"))
}

/// Exchange a refresh token for a new access token (rotation-on-use).
///
/// Existing access tokens survive; multi-device sessions are unaffected.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "auth"
)]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse<RefreshResponse>, AuthError> {
    let (user_id, new_refresh_token) =
        with_retry(|| auth::refresh::rotate(&state.db, &payload.refresh_token)).await?;

    let (token, _token_id) = auth::access::mint(&state.db, user_id).await?;

    tracing::debug!(user_id, "refresh token rotated");

    Ok(ApiResponse::success(
        "Token refreshed successfully",
        RefreshResponse {
            token,
            refresh_token: new_refresh_token,
        },
    ))
}

/// Request a password-reset email.
///
/// The plaintext token goes to the mailer collaborator only; it is never
/// logged and never returned to the HTTP caller.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub(crate) async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ApiResponse<()>, AuthError> {
    let email = normalize_email(&payload.email);

    let user_model = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let token = auth::reset::create_request(
        &state.db,
        user_model.id,
        &user_model.email,
        state.config.auth.reset_token_expiry_secs,
    )
    .await?;

    // Fire-and-forget: delivery failure never rolls back the token.
    if let Err(e) = state.mailer.send_password_reset(&user_model, &token).await {
        tracing::warn!(user_id = user_model.id, error = %e, "reset email delivery failed");
    }

    Ok(ApiResponse::message("Password reset link sent successfully."))
}

/// Reset the password with an emailed token.
///
/// On success all access tokens are revoked and the refresh token is
/// cleared; every device must log in with the new password.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 401, description = "Invalid or expired token"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub(crate) async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, AuthError> {
    let mut errors = Vec::new();
    check_password_pair(
        &payload.password,
        &payload.password_confirmation,
        state.config.auth.min_password_length,
        &mut errors,
    );
    if payload.token.trim().is_empty() {
        errors.push(FieldError::new("token", "Token is required"));
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let email = normalize_email(&payload.email);

    let user_id = with_retry(|| {
        auth::reset::validate_and_consume(&state.db, &email, &payload.token, &payload.password)
    })
    .await?;

    // A reset proves control of the email, not possession of any session:
    // invalidate everything outstanding.
    auth::access::revoke_all(&state.db, user_id).await?;
    auth::refresh::clear(&state.db, user_id).await?;

    tracing::info!(user_id, "password reset completed");

    Ok(ApiResponse::message("Password reset successfully."))
}
