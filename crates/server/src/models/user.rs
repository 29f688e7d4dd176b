//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pvz_core::{Email, Role, UserId};

/// A registered operator.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}
