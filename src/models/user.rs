use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User entity — the identity record owned by the credential store.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Stored lowercased; uniqueness enforced by index, not just pre-checks.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string (excluded from serialization via serde skip)
    #[serde(skip_serializing)]
    #[schema(read_only)]
    pub password_hash: String,

    /// Stored avatar blob reference (resolved by the storage backend)
    pub avatar: Option<String>,

    pub description: Option<String>,

    /// The single live refresh token, replaced on every rotation.
    /// Never serialized outward.
    #[serde(skip_serializing)]
    #[schema(read_only)]
    pub refresh_token: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Public user data (safe to return in API responses).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Model> for UserResponse {
    fn from(user: Model) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            description: user.description,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
