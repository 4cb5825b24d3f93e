use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                     // assigned by the store
    pub email: String,                // unique, stored as supplied
    #[serde(skip_serializing)]
    pub password_hash: String,        // bcrypt/argon2 hash, not exposed in JSON
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// Per-user session record, created together with the user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub created_at: OffsetDateTime,
}

/// Fields the caller supplies when creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}
