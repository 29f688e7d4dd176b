//! In-memory implementation of the repository port.
//!
//! Intended for tests. A transaction holds the store's lock from `begin`
//! until it is committed or dropped, so transactions are fully serialized.
//! Writes go to a working copy that only replaces the shared state on commit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use pvz_core::{Email, PickupPointId, ProductId, ReceptionId, ReceptionStatus, UserId};

use super::{
    Page, PickupPointStore, ProductStore, ReceptionStore, RepositoryError, Store, Transaction,
    UserStore,
};
use crate::models::{DateRange, NewUser, PickupPoint, Product, Reception, User};

#[derive(Debug, Clone, Default)]
struct State {
    pickup_points: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    /// Insertion order is the tie-breaker for equal timestamps.
    products: Vec<Product>,
    users: Vec<User>,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    user_lookups: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

/// Exclusive hold on a [`MemoryStore`]; transactions wait until it is dropped.
pub struct MemoryStoreLock {
    _guard: OwnedMutexGuard<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_user_by_id` calls made so far.
    #[must_use]
    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    /// Make `begin` and `health_check` fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Block every transaction until the returned lock is dropped.
    pub async fn lock(&self) -> MemoryStoreLock {
        MemoryStoreLock {
            _guard: Arc::clone(&self.state).lock_owned().await,
        }
    }

    /// Committed receptions, in insertion order.
    pub async fn receptions(&self) -> Vec<Reception> {
        self.state.lock().await.receptions.clone()
    }

    /// Committed products, in insertion order.
    pub async fn products(&self) -> Vec<Product> {
        self.state.lock().await.products.clone()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepositoryError> {
        self.check_available()?;
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            user_lookups: Arc::clone(&self.user_lookups),
        }))
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
    user_lookups: Arc<AtomicUsize>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl PickupPointStore for MemoryTransaction {
    async fn create_pickup_point(&mut self, point: &PickupPoint) -> Result<(), RepositoryError> {
        if self.working.pickup_points.iter().any(|p| p.id == point.id) {
            return Err(RepositoryError::Conflict("pvz already exists".to_owned()));
        }
        self.working.pickup_points.push(point.clone());
        Ok(())
    }

    async fn get_pickup_point_by_id(
        &mut self,
        id: PickupPointId,
    ) -> Result<PickupPoint, RepositoryError> {
        self.working
            .pickup_points
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_pickup_points(
        &mut self,
        range: DateRange,
        page: Page,
    ) -> Result<Vec<PickupPoint>, RepositoryError> {
        let mut points: Vec<PickupPoint> = self
            .working
            .pickup_points
            .iter()
            .filter(|p| range.contains(p.registration_date))
            .cloned()
            .collect();
        points.sort_by(|a, b| {
            b.registration_date
                .cmp(&a.registration_date)
                .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
        });

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(points.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl ReceptionStore for MemoryTransaction {
    async fn create_reception(&mut self, reception: &Reception) -> Result<(), RepositoryError> {
        let second_open = reception.is_open()
            && self
                .working
                .receptions
                .iter()
                .any(|r| r.pvz_id == reception.pvz_id && r.is_open());
        if second_open {
            return Err(RepositoryError::Conflict(
                "open reception already exists".to_owned(),
            ));
        }
        self.working.receptions.push(reception.clone());
        Ok(())
    }

    async fn get_open_reception_by_pickup_point(
        &mut self,
        pickup_point: PickupPointId,
    ) -> Result<Reception, RepositoryError> {
        self.working
            .receptions
            .iter()
            .find(|r| r.pvz_id == pickup_point && r.is_open())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_reception_status(
        &mut self,
        id: ReceptionId,
        status: ReceptionStatus,
    ) -> Result<Reception, RepositoryError> {
        let reception = self
            .working
            .receptions
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        reception.status = status;
        Ok(reception.clone())
    }

    async fn list_receptions_by_pickup_point(
        &mut self,
        pickup_point: PickupPointId,
    ) -> Result<Vec<Reception>, RepositoryError> {
        let mut receptions: Vec<Reception> = self
            .working
            .receptions
            .iter()
            .filter(|r| r.pvz_id == pickup_point)
            .cloned()
            .collect();
        receptions.sort_by_key(|r| r.date_time);
        Ok(receptions)
    }
}

#[async_trait]
impl ProductStore for MemoryTransaction {
    async fn create_product(&mut self, product: &Product) -> Result<(), RepositoryError> {
        self.working.products.push(product.clone());
        Ok(())
    }

    async fn get_most_recent_product_by_reception(
        &mut self,
        reception: ReceptionId,
    ) -> Result<Product, RepositoryError> {
        self.working
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| p.reception_id == reception)
            .max_by_key(|(seq, p)| (p.date_time, *seq))
            .map(|(_, p)| p.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_product_by_id(&mut self, id: ProductId) -> Result<(), RepositoryError> {
        let before = self.working.products.len();
        self.working.products.retain(|p| p.id != id);
        if self.working.products.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_products_by_reception(
        &mut self,
        reception: ReceptionId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .working
            .products
            .iter()
            .filter(|p| p.reception_id == reception)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        products.sort_by_key(|p| p.date_time);
        Ok(products)
    }
}

#[async_trait]
impl UserStore for MemoryTransaction {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, RepositoryError> {
        if self.working.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let created = User {
            id: user.id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: chrono::Utc::now(),
        };
        self.working.users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_id(&mut self, id: UserId) -> Result<User, RepositoryError> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.working
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_user_by_email(&mut self, email: &Email) -> Result<User, RepositoryError> {
        self.working
            .users
            .iter()
            .find(|u| &u.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pvz_core::City;

    use super::*;

    fn point() -> PickupPoint {
        PickupPoint {
            id: PickupPointId::generate(),
            registration_date: Utc::now(),
            city: City::Moscow,
        }
    }

    fn open_reception(pvz_id: PickupPointId) -> Reception {
        Reception {
            id: ReceptionId::generate(),
            date_time: Utc::now(),
            pvz_id,
            status: ReceptionStatus::Open,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_rolls_back() {
        let store = MemoryStore::new();
        let point = point();

        {
            let mut tx = store.begin().await.unwrap();
            tx.create_pickup_point(&point).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            tx.get_pickup_point_by_id(point.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let store = MemoryStore::new();
        let point = point();

        let mut tx = store.begin().await.unwrap();
        tx.create_pickup_point(&point).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_pickup_point_by_id(point.id).await.unwrap(), point);
    }

    #[tokio::test]
    async fn test_second_open_reception_conflicts() {
        let store = MemoryStore::new();
        let point = point();

        let mut tx = store.begin().await.unwrap();
        tx.create_pickup_point(&point).await.unwrap();
        tx.create_reception(&open_reception(point.id)).await.unwrap();

        let result = tx.create_reception(&open_reception(point.id)).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_most_recent_product_breaks_ties_by_insertion() {
        let store = MemoryStore::new();
        let reception = open_reception(PickupPointId::generate());
        let at = Utc::now();

        let mut tx = store.begin().await.unwrap();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let product = Product {
                id: ProductId::generate(),
                date_time: at,
                product_type: pvz_core::ProductType::Shoes,
                reception_id: reception.id,
            };
            ids.push(product.id);
            tx.create_product(&product).await.unwrap();
        }

        let latest = tx
            .get_most_recent_product_by_reception(reception.id)
            .await
            .unwrap();
        assert_eq!(Some(&latest.id), ids.last());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_to_begin() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.begin().await,
            Err(RepositoryError::Database(_))
        ));
        assert!(store.health_check().await.is_err());
    }
}
