//! Persistence for the pickup point service.
//!
//! # Database: `pvz`
//!
//! ## Tables
//!
//! - `users` - Registered operators (email, role, Argon2 hash)
//! - `pvzs` - Pickup points
//! - `receptions` - Reception sessions, at most one `in_progress` per pickup point
//! - `products` - Products accepted during a reception
//!
//! All access goes through the [`Store`] port, which hands out
//! [`Transaction`]s. The workflow never talks to `sqlx` directly.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p pvz-cli -- migrate
//! ```

mod postgres;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use postgres::PgStore;
pub use store::{
    Page, PickupPointStore, ProductStore, ReceptionStore, Store, Transaction, UserStore,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, second open reception).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a failed insert, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(what.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url.expose_secret())
        .await
}
