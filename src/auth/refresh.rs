use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::auth::token::{constant_time_eq, generate_secure_token};
use crate::error::AuthError;
use crate::models::user;

/// Token material size: 64 random bytes, hex-encoded to 128 chars.
const REFRESH_TOKEN_BYTES: usize = 64;

/// Issue a refresh token for a user, unconditionally overwriting any stored
/// value (no history kept). Returns the plaintext.
pub async fn issue(db: &DatabaseConnection, user_id: i32) -> Result<String, AuthError> {
    use sea_orm::sea_query::Expr;

    let raw_token = generate_secure_token(REFRESH_TOKEN_BYTES);

    user::Entity::update_many()
        .col_expr(user::Column::RefreshToken, Expr::value(raw_token.clone()))
        .col_expr(
            user::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    Ok(raw_token)
}

/// Rotate a presented refresh token.
///
/// Finds the user whose stored token matches, then replaces it with a fresh
/// value via a conditional UPDATE keyed on the presented value, so exactly
/// one concurrent caller can win; everyone else observes
/// [`AuthError::InvalidOrExpiredToken`]. The error does not reveal whether
/// the token was stale or never issued.
pub async fn rotate(
    db: &DatabaseConnection,
    presented: &str,
) -> Result<(i32, String), AuthError> {
    use sea_orm::sea_query::Expr;

    let user_model = user::Entity::find()
        .filter(user::Column::RefreshToken.eq(presented))
        .one(db)
        .await?
        .ok_or(AuthError::InvalidOrExpiredToken)?;

    // Re-check the fetched value in constant time before trusting the
    // index lookup.
    match user_model.refresh_token.as_deref() {
        Some(stored) if constant_time_eq(stored, presented) => {}
        _ => return Err(AuthError::InvalidOrExpiredToken),
    }

    let replacement = generate_secure_token(REFRESH_TOKEN_BYTES);

    // Compare-and-swap: the presented token is invalidated in the same
    // operation that stores its replacement.
    let result = user::Entity::update_many()
        .col_expr(
            user::Column::RefreshToken,
            Expr::value(replacement.clone()),
        )
        .col_expr(
            user::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(user::Column::Id.eq(user_model.id))
        .filter(user::Column::RefreshToken.eq(presented))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        // A concurrent caller rotated the same token first.
        return Err(AuthError::InvalidOrExpiredToken);
    }

    Ok((user_model.id, replacement))
}

/// Clear the stored refresh token (logout / password change). Idempotent.
pub async fn clear(db: &DatabaseConnection, user_id: i32) -> Result<(), AuthError> {
    use sea_orm::sea_query::Expr;

    user::Entity::update_many()
        .col_expr(
            user::Column::RefreshToken,
            Expr::value(Option::<String>::None),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    Ok(())
}
