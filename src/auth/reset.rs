use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::auth::password::hash_password;
use crate::auth::token::{constant_time_eq, generate_secure_token, hash_token};
use crate::error::AuthError;
use crate::models::{password_reset_token, user};

/// Token material size: 32 random bytes, hex-encoded to 64 chars.
const RESET_TOKEN_BYTES: usize = 32;

/// Create a password-reset request for a user, superseding any prior
/// pending request (the previous token becomes permanently invalid even if
/// unexpired). Returns the plaintext token to hand to the mailer.
pub async fn create_request(
    db: &DatabaseConnection,
    user_id: i32,
    email: &str,
    expiry_secs: u64,
) -> Result<String, AuthError> {
    password_reset_token::Entity::delete_many()
        .filter(password_reset_token::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    let raw_token = generate_secure_token(RESET_TOKEN_BYTES);
    let now = Utc::now().naive_utc();

    let model = password_reset_token::ActiveModel {
        user_id: Set(user_id),
        email: Set(email.to_string()),
        token_hash: Set(hash_token(&raw_token)),
        expires_at: Set(now + Duration::seconds(expiry_secs as i64)),
        consumed: Set(false),
        created_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await?;

    Ok(raw_token)
}

/// Validate a reset token and consume it, setting the new password hash.
///
/// Wrong, expired, and already-used tokens are indistinguishable: all fail
/// with [`AuthError::InvalidOrExpiredToken`]. The consume and the password
/// write happen in one transaction, with the consume keyed on
/// `consumed = false` so exactly one concurrent caller can succeed; partial
/// state is never observable.
///
/// Returns the user id so the caller can apply its token-revocation policy.
pub async fn validate_and_consume(
    db: &DatabaseConnection,
    email: &str,
    raw_token: &str,
    new_password: &str,
) -> Result<i32, AuthError> {
    use sea_orm::sea_query::Expr;

    let now = Utc::now().naive_utc();

    let user_model = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let record = password_reset_token::Entity::find()
        .filter(password_reset_token::Column::UserId.eq(user_model.id))
        .one(db)
        .await?
        .ok_or(AuthError::InvalidOrExpiredToken)?;

    if record.consumed || record.expires_at < now || record.email != user_model.email {
        return Err(AuthError::InvalidOrExpiredToken);
    }

    if !constant_time_eq(&record.token_hash, &hash_token(raw_token)) {
        return Err(AuthError::InvalidOrExpiredToken);
    }

    // Hash outside the transaction; argon2 is deliberately slow.
    let new_hash = hash_password(new_password)?;

    let txn = db.begin().await?;

    let consumed = password_reset_token::Entity::update_many()
        .col_expr(password_reset_token::Column::Consumed, Expr::value(true))
        .filter(password_reset_token::Column::Id.eq(record.id))
        .filter(password_reset_token::Column::Consumed.eq(false))
        .exec(&txn)
        .await?;

    if consumed.rows_affected != 1 {
        // Lost the race to a concurrent consumer; dropping the transaction
        // rolls it back.
        return Err(AuthError::InvalidOrExpiredToken);
    }

    user::Entity::update_many()
        .col_expr(user::Column::PasswordHash, Expr::value(new_hash))
        .col_expr(user::Column::UpdatedAt, Expr::value(now))
        .filter(user::Column::Id.eq(user_model.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(user_model.id)
}
