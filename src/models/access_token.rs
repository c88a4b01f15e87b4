use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access token entity for bearer authentication.
///
/// Only the SHA-256 digest of the opaque token is persisted; the plaintext
/// leaves the issuer exactly once, at mint time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The user who owns this token
    pub user_id: i32,

    /// SHA-256 digest of the opaque token string
    #[sea_orm(unique)]
    pub token_hash: String,

    /// Whether this token has been revoked
    #[sea_orm(default_value = false)]
    pub revoked: bool,

    /// Best-effort timestamp of the last successful authentication
    pub last_used_at: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
