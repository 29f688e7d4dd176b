//! Operator account management.
//!
//! # Usage
//!
//! ```bash
//! pvz-cli user create -e moderator@pvz.example -p 'correct horse' -r moderator
//! ```
//!
//! # Environment Variables
//!
//! - `PVZ_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use pvz_core::{Email, Role, UserId};
use pvz_server::config::{ConfigError, get_database_url};
use pvz_server::db::{PgStore, RepositoryError, Store, create_pool};
use pvz_server::models::NewUser;
use pvz_server::services::ServiceError;
use pvz_server::services::auth::{PasswordHasher, validate_password};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid role: {0}. Valid roles: employee, moderator")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    InvalidPassword(ServiceError),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Create a new operator account.
///
/// Applies the same email, password and role rules as `POST /register`.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if any input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(email: &str, password: &str, role: &str) -> Result<UserId, UserError> {
    dotenvy::dotenv().ok();

    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|_| UserError::InvalidEmail(email.to_owned()))?;
    validate_password(password).map_err(UserError::InvalidPassword)?;

    let hasher = PasswordHasher::production().map_err(|e| UserError::Hash(e.to_string()))?;
    let password_hash = hasher
        .hash_blocking(password.to_owned())
        .await
        .map_err(|e| UserError::Hash(e.to_string()))?;

    let database_url = get_database_url("PVZ_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let store = PgStore::new(create_pool(&database_url).await?);

    tracing::info!("Creating user: {} ({})", email, role);

    let new_user = NewUser {
        id: UserId::generate(),
        email: email.clone(),
        password_hash,
        role,
    };

    let mut tx = store.begin().await?;
    let user = tx.create_user(&new_user).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
        other => other.into(),
    })?;
    tx.commit().await?;

    Ok(user.id)
}
