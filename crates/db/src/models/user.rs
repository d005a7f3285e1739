//! User account model and DTOs.

use sqlx::FromRow;
use saivd_core::types::{EntityId, Timestamp};

/// Full user row from the `users` table.
///
/// Carries the password hash, so it is never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user. `email` must already be normalized.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}
