use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::token::{generate_secure_token, hash_token};
use crate::error::AuthError;
use crate::models::access_token;

/// Token material size: 32 random bytes, hex-encoded to 64 chars.
const ACCESS_TOKEN_BYTES: usize = 32;

/// Mint an access token for a user. Returns `(plaintext, token_id)`.
///
/// Only the digest is persisted; the plaintext leaves here exactly once.
pub async fn mint(db: &DatabaseConnection, user_id: i32) -> Result<(String, i32), AuthError> {
    let raw_token = generate_secure_token(ACCESS_TOKEN_BYTES);
    let now = Utc::now().naive_utc();

    let model = access_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(hash_token(&raw_token)),
        revoked: Set(false),
        last_used_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok((raw_token, inserted.id))
}

/// Resolve a presented bearer token to `(user_id, token_id)`.
///
/// Unknown and revoked digests both fail with [`AuthError::InvalidToken`].
/// On success the `last_used_at` stamp is updated best-effort; a failed
/// stamp never fails the authentication.
pub async fn authenticate(db: &DatabaseConnection, raw_token: &str) -> Result<(i32, i32), AuthError> {
    let token_hash = hash_token(raw_token);

    let token_model = access_token::Entity::find()
        .filter(access_token::Column::TokenHash.eq(&token_hash))
        .one(db)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if token_model.revoked {
        return Err(AuthError::InvalidToken);
    }

    let user_id = token_model.user_id;
    let token_id = token_model.id;

    let mut active: access_token::ActiveModel = token_model.into();
    active.last_used_at = Set(Some(Utc::now().naive_utc()));
    if let Err(e) = active.update(db).await {
        tracing::debug!(error = %e, token_id, "failed to stamp last_used_at");
    }

    Ok((user_id, token_id))
}

/// Revoke every live access token for a user (logout everywhere). Idempotent.
///
/// A single UPDATE, so revocation is visible to subsequent `authenticate`
/// calls as soon as this returns.
pub async fn revoke_all(db: &DatabaseConnection, user_id: i32) -> Result<(), AuthError> {
    use sea_orm::sea_query::Expr;

    access_token::Entity::update_many()
        .col_expr(access_token::Column::Revoked, Expr::value(true))
        .filter(access_token::Column::UserId.eq(user_id))
        .filter(access_token::Column::Revoked.eq(false))
        .exec(db)
        .await?;

    Ok(())
}

/// Revoke every live access token for a user except one (password change
/// keeps the session that performed it). Idempotent.
pub async fn revoke_all_except(
    db: &DatabaseConnection,
    user_id: i32,
    keep_token_id: i32,
) -> Result<(), AuthError> {
    use sea_orm::sea_query::Expr;

    access_token::Entity::update_many()
        .col_expr(access_token::Column::Revoked, Expr::value(true))
        .filter(access_token::Column::UserId.eq(user_id))
        .filter(access_token::Column::Revoked.eq(false))
        .filter(access_token::Column::Id.ne(keep_token_id))
        .exec(db)
        .await?;

    Ok(())
}
