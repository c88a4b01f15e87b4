use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pending password-reset request.
///
/// At most one live record exists per user; a new request supersedes the
/// previous one. The token digest is stored, never the plaintext, and the
/// email is a bound copy that must still match the user at consume time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "password_reset_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The user this request belongs to
    pub user_id: i32,

    /// Email the token was issued for
    pub email: String,

    /// SHA-256 digest of the token value
    #[sea_orm(unique)]
    pub token_hash: String,

    /// When the token expires
    pub expires_at: NaiveDateTime,

    /// Whether the token has been consumed
    #[sea_orm(default_value = false)]
    pub consumed: bool,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
