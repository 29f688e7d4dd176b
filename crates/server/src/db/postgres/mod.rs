//! `PostgreSQL` implementation of the repository port.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

mod pickup_points;
mod products;
mod receptions;
mod users;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::{RepositoryError, Store, Transaction};

/// Store backed by a `PostgreSQL` connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// An open `PostgreSQL` transaction.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
pub struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
