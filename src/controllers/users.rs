use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, hash_password, verify_password};
use crate::error::{AuthError, FieldError};
use crate::extractors::{AuthUser, Json, Pagination};
use crate::models::user::{self, Entity as User, UserResponse};
use crate::response::ApiResponse;
use crate::storage::validate_content_type;

use super::{check_password_pair, is_valid_email, normalize_email, AppState};

const ALLOWED_AVATAR_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// Fields collected from the multipart profile-update form.
#[derive(Default)]
struct ProfileForm {
    name: Option<String>,
    email: Option<String>,
    description: Option<String>,
    image: Option<(String, String, Vec<u8>)>, // (filename, content_type, bytes)
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
        .route("/{id}", get(show).put(update))
}

// ── Handlers ──

/// Current authenticated user's record.
#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub(crate) async fn me(
    State(state): State<AppState>,
    principal: AuthUser,
) -> Result<ApiResponse<UserResponse>, AuthError> {
    let user_model = User::find_by_id(principal.user_id)
        .one(&state.db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(ApiResponse::success("OK", UserResponse::from(user_model)))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub(crate) async fn show(
    State(state): State<AppState>,
    _principal: AuthUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<UserResponse>, AuthError> {
    let user_model = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(ApiResponse::success("OK", UserResponse::from(user_model)))
}

/// List users with pagination and optional name/email search.
#[utoipa::path(
    get,
    path = "/api/user",
    params(Pagination),
    responses(
        (status = 200, description = "Users", body = ApiResponse<UserListResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub(crate) async fn index(
    State(state): State<AppState>,
    _principal: AuthUser,
    pagination: Pagination,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<UserListResponse>, AuthError> {
    let mut finder = User::find();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        finder = finder.filter(
            Condition::any()
                .add(user::Column::Name.contains(search))
                .add(user::Column::Email.contains(search)),
        );
    }

    let total = finder.clone().count(&state.db).await?;
    let users = finder
        .order_by_asc(user::Column::Id)
        .limit(pagination.limit)
        .offset(pagination.offset)
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        UserListResponse {
            users,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        },
    ))
}

/// Update the caller's profile (multipart form: name, email, description,
/// optional avatar image).
///
/// Avatar replacement is store-then-delete: the old blob is removed only
/// after the new one is confirmed stored.
async fn update(
    State(state): State<AppState>,
    principal: AuthUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<ApiResponse<UserResponse>, AuthError> {
    if principal.user_id != id {
        return Err(AuthError::Forbidden(
            "You may only update your own profile".to_string(),
        ));
    }

    let user_model = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let form = read_profile_form(&mut multipart).await?;

    let name = form.name.unwrap_or_default();
    let email = normalize_email(&form.email.unwrap_or_default());

    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.len() > 255 {
        errors.push(FieldError::new("name", "Name may not exceed 255 characters"));
    }
    if !is_valid_email(&email) || email.len() > 255 {
        errors.push(FieldError::new("email", "A valid email address is required"));
    }
    if let Some((_, content_type, bytes)) = &form.image {
        if bytes.len() as u64 > state.config.max_avatar_size {
            errors.push(FieldError::new(
                "image",
                format!(
                    "Image may not exceed {} bytes",
                    state.config.max_avatar_size
                ),
            ));
        }
        if let Err(AuthError::Validation(mut e)) =
            validate_content_type(content_type, ALLOWED_AVATAR_TYPES)
        {
            errors.append(&mut e);
        }
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    // Uniqueness excluding the caller's own row; the unique index still
    // closes the race at save time.
    let taken = User::find()
        .filter(user::Column::Email.eq(&email))
        .filter(user::Column::Id.ne(id))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let old_avatar = user_model.avatar.clone();
    let mut new_avatar = None;
    if let Some((filename, content_type, bytes)) = form.image {
        let stored = state.storage.store(&filename, &content_type, &bytes).await?;
        tracing::info!(user_id = id, stored_name = %stored.stored_name, "avatar stored");
        new_avatar = Some(stored.stored_name);
    }

    let mut active: user::ActiveModel = user_model.into();
    active.name = Set(name.trim().to_string());
    active.email = Set(email);
    if let Some(description) = form.description {
        active.description = Set(Some(description));
    }
    if let Some(ref avatar) = new_avatar {
        active.avatar = Set(Some(avatar.clone()));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = match active.update(&state.db).await {
        Ok(u) => u,
        Err(e) => {
            // Roll the stored blob back so a failed save leaks nothing.
            if let Some(ref avatar) = new_avatar {
                let _ = state.storage.delete(avatar).await;
            }
            return Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::EmailTaken,
                _ => AuthError::Database(e),
            });
        }
    };

    // New blob is stored and referenced; the old one can go now.
    if new_avatar.is_some() {
        if let Some(old) = old_avatar {
            if let Err(e) = state.storage.delete(&old).await {
                tracing::warn!(user_id = id, stored_name = %old, error = %e, "failed to delete old avatar");
            }
        }
    }

    Ok(ApiResponse::success(
        "User updated successfully.",
        UserResponse::from(updated),
    ))
}

/// Change the caller's password, verifying the current one first.
///
/// Other sessions are revoked and the refresh token cleared; the session
/// that performed the change stays valid.
#[utoipa::path(
    post,
    path = "/api/user/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub(crate) async fn change_password(
    State(state): State<AppState>,
    principal: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AuthError> {
    let mut errors = Vec::new();
    check_password_pair(
        &payload.password,
        &payload.password_confirmation,
        state.config.auth.min_password_length,
        &mut errors,
    );
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let user_model = User::find_by_id(principal.user_id)
        .one(&state.db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !verify_password(&payload.current_password, &user_model.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let new_hash = hash_password(&payload.password)?;
    let mut active: user::ActiveModel = user_model.into();
    active.password_hash = Set(new_hash);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    // A stolen refresh token must not survive a password change.
    auth::access::revoke_all_except(&state.db, principal.user_id, principal.token_id).await?;
    auth::refresh::clear(&state.db, principal.user_id).await?;

    tracing::info!(user_id = principal.user_id, "password changed");

    Ok(ApiResponse::message("Password changed successfully."))
}

// ── Helpers ──

async fn read_profile_form(multipart: &mut Multipart) -> Result<ProfileForm, AuthError> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AuthError::Validation(vec![FieldError::new(
            "body",
            format!("Multipart error: {}", e),
        )])
    })? {
        let Some(field_name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        match field_name.as_str() {
            "name" => form.name = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "image" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "avatar".to_string());
                let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_else(
                    || {
                        mime_guess::from_path(&filename)
                            .first_or_octet_stream()
                            .to_string()
                    },
                );
                let bytes = field.bytes().await.map_err(|e| {
                    AuthError::Validation(vec![FieldError::new(
                        "image",
                        format!("Failed to read image: {}", e),
                    )])
                })?;
                form.image = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AuthError> {
    field.text().await.map_err(|e| {
        AuthError::Validation(vec![FieldError::new(
            "body",
            format!("Failed to read field: {}", e),
        )])
    })
}
