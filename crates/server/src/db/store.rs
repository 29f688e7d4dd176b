//! Repository port consumed by the workflow and identity services.
//!
//! Every operation runs against a single [`Transaction`]. Reads that guard a
//! write happen on the same handle as the write, so check-then-act sequences
//! are atomic. Lookups that miss return [`RepositoryError::NotFound`].

use async_trait::async_trait;

use pvz_core::{Email, PickupPointId, ProductId, ReceptionId, ReceptionStatus, UserId};

use super::RepositoryError;
use crate::models::{DateRange, NewUser, PickupPoint, Product, Reception, User};

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.number.saturating_sub(1)) * i64::from(self.size)
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[async_trait]
pub trait PickupPointStore: Send {
    async fn create_pickup_point(&mut self, point: &PickupPoint) -> Result<(), RepositoryError>;

    async fn get_pickup_point_by_id(
        &mut self,
        id: PickupPointId,
    ) -> Result<PickupPoint, RepositoryError>;

    /// Pickup points registered within `range`, newest first.
    async fn list_pickup_points(
        &mut self,
        range: DateRange,
        page: Page,
    ) -> Result<Vec<PickupPoint>, RepositoryError>;
}

#[async_trait]
pub trait ReceptionStore: Send {
    /// Insert a reception.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the reception is open and
    /// its pickup point already has an open reception.
    async fn create_reception(&mut self, reception: &Reception) -> Result<(), RepositoryError>;

    /// The open reception of `pickup_point`, locked for the rest of the
    /// transaction.
    async fn get_open_reception_by_pickup_point(
        &mut self,
        pickup_point: PickupPointId,
    ) -> Result<Reception, RepositoryError>;

    async fn update_reception_status(
        &mut self,
        id: ReceptionId,
        status: ReceptionStatus,
    ) -> Result<Reception, RepositoryError>;

    /// Receptions of `pickup_point`, oldest first.
    async fn list_receptions_by_pickup_point(
        &mut self,
        pickup_point: PickupPointId,
    ) -> Result<Vec<Reception>, RepositoryError>;
}

#[async_trait]
pub trait ProductStore: Send {
    async fn create_product(&mut self, product: &Product) -> Result<(), RepositoryError>;

    /// The product with the latest `date_time`; insertion order breaks ties.
    async fn get_most_recent_product_by_reception(
        &mut self,
        reception: ReceptionId,
    ) -> Result<Product, RepositoryError>;

    async fn delete_product_by_id(&mut self, id: ProductId) -> Result<(), RepositoryError>;

    /// Products of `reception` in insertion order.
    async fn list_products_by_reception(
        &mut self,
        reception: ReceptionId,
    ) -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
pub trait UserStore: Send {
    /// Insert a user. Fails with [`RepositoryError::Conflict`] on a duplicate email.
    async fn create_user(&mut self, user: &NewUser) -> Result<User, RepositoryError>;

    async fn get_user_by_id(&mut self, id: UserId) -> Result<User, RepositoryError>;

    async fn get_user_by_email(&mut self, email: &Email) -> Result<User, RepositoryError>;
}

/// A unit of work over every entity store.
///
/// Dropping a transaction without calling [`Transaction::commit`] rolls it back.
#[async_trait]
pub trait Transaction: PickupPointStore + ReceptionStore + ProductStore + UserStore {
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Entry point to a transactional backend.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepositoryError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}
