use pvz_core::{PickupPointId, ProductId, ProductType};

use super::{Workflow, now, open_reception_lookup, pickup_point_lookup};
use crate::db::RepositoryError;
use crate::models::Product;
use crate::services::{RequestScope, ServiceError};

impl Workflow {
    /// Add a product of `product_type` to the open reception at `pvz_id`.
    ///
    /// # Errors
    ///
    /// - `ServiceError::InvalidInput` if `product_type` is unknown
    /// - `ServiceError::NotFound` if the pickup point does not exist
    /// - `ServiceError::NoOpenReception` if no reception is open
    #[tracing::instrument(skip(self, scope))]
    pub async fn add_product(
        &self,
        scope: &RequestScope,
        pvz_id: PickupPointId,
        product_type: &str,
    ) -> Result<Product, ServiceError> {
        let product_type: ProductType = product_type
            .parse()
            .map_err(|_| ServiceError::InvalidInput("invalid product type"))?;

        let product = scope
            .run(async {
                let mut tx = self.store.begin().await?;
                tx.get_pickup_point_by_id(pvz_id)
                    .await
                    .map_err(pickup_point_lookup)?;
                let reception = tx
                    .get_open_reception_by_pickup_point(pvz_id)
                    .await
                    .map_err(open_reception_lookup)?;

                let product = Product {
                    id: ProductId::generate(),
                    date_time: now(),
                    product_type,
                    reception_id: reception.id,
                };
                tx.create_product(&product).await?;
                tx.commit().await?;
                Ok::<_, ServiceError>(product)
            })
            .await?;

        self.metrics.product_added();
        tracing::info!(
            pvz_id = %pvz_id,
            reception_id = %product.reception_id,
            product_id = %product.id,
            "product added"
        );
        Ok(product)
    }

    /// Remove the most recently added product of the open reception at `pvz_id`.
    ///
    /// The product is selected and then deleted by id inside one
    /// transaction that holds the reception's lock.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the pickup point does not exist
    /// - `ServiceError::NoOpenReception` if no reception is open
    /// - `ServiceError::NoProductsToDelete` if the open reception is empty
    #[tracing::instrument(skip(self, scope))]
    pub async fn remove_last_product(
        &self,
        scope: &RequestScope,
        pvz_id: PickupPointId,
    ) -> Result<Product, ServiceError> {
        let removed = scope
            .run(async {
                let mut tx = self.store.begin().await?;
                tx.get_pickup_point_by_id(pvz_id)
                    .await
                    .map_err(pickup_point_lookup)?;
                let reception = tx
                    .get_open_reception_by_pickup_point(pvz_id)
                    .await
                    .map_err(open_reception_lookup)?;

                let last = tx
                    .get_most_recent_product_by_reception(reception.id)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::NotFound => ServiceError::NoProductsToDelete,
                        other => other.into(),
                    })?;
                tx.delete_product_by_id(last.id).await?;
                tx.commit().await?;
                Ok::<_, ServiceError>(last)
            })
            .await?;

        tracing::info!(
            pvz_id = %pvz_id,
            reception_id = %removed.reception_id,
            product_id = %removed.id,
            "product removed"
        );
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use pvz_core::ReceptionStatus;

    use super::super::test_support::harness;
    use super::*;

    #[tokio::test]
    async fn test_add_then_remove_last() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();

        let mut added = Vec::new();
        for kind in ["электроника", "одежда", "обувь"] {
            added.push(h.workflow.add_product(&scope, point.id, kind).await.unwrap());
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let removed = h
            .workflow
            .remove_last_product(&scope, point.id)
            .await
            .unwrap();
        assert_eq!(removed.id, added[2].id);

        let remaining = h.store.products().await;
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|p| p.date_time < removed.date_time));
        assert!(
            h.metrics
                .render()
                .unwrap()
                .contains("product_added_total 3")
        );
    }

    #[tokio::test]
    async fn test_remove_respects_stack_order() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Казань")
            .await
            .unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();

        let first = h
            .workflow
            .add_product(&scope, point.id, "одежда")
            .await
            .unwrap();
        let second = h
            .workflow
            .add_product(&scope, point.id, "обувь")
            .await
            .unwrap();

        let popped = h
            .workflow
            .remove_last_product(&scope, point.id)
            .await
            .unwrap();
        assert_eq!(popped.id, second.id);
        let popped = h
            .workflow
            .remove_last_product(&scope, point.id)
            .await
            .unwrap();
        assert_eq!(popped.id, first.id);

        let empty = h.workflow.remove_last_product(&scope, point.id).await;
        assert!(matches!(empty, Err(ServiceError::NoProductsToDelete)));
    }

    #[tokio::test]
    async fn test_add_without_open_reception() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();

        let result = h.workflow.add_product(&scope, point.id, "обувь").await;

        assert!(matches!(result, Err(ServiceError::NoOpenReception)));
        assert!(h.store.products().await.is_empty());
        assert!(
            h.metrics
                .render()
                .unwrap()
                .contains("product_added_total 0")
        );
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_type() {
        let h = harness();
        let result = h
            .workflow
            .add_product(&RequestScope::new(), PickupPointId::generate(), "мебель")
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::InvalidInput("invalid product type"))
        ));
    }

    #[tokio::test]
    async fn test_add_to_closed_reception_fails() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();
        h.workflow
            .close_last_reception(&scope, point.id)
            .await
            .unwrap();

        let result = h.workflow.add_product(&scope, point.id, "обувь").await;
        assert!(matches!(result, Err(ServiceError::NoOpenReception)));
    }

    #[tokio::test]
    async fn test_remove_from_empty_reception_changes_nothing() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();
        let reception = h.workflow.open_reception(&scope, point.id).await.unwrap();

        let result = h.workflow.remove_last_product(&scope, point.id).await;

        assert!(matches!(result, Err(ServiceError::NoProductsToDelete)));
        assert!(h.store.products().await.is_empty());
        let receptions = h.store.receptions().await;
        assert_eq!(receptions, vec![reception]);
    }

    #[tokio::test]
    async fn test_remove_distinguishes_missing_pickup_point_from_no_reception() {
        let h = harness();
        let scope = RequestScope::new();

        let missing = h
            .workflow
            .remove_last_product(&scope, PickupPointId::generate())
            .await;
        assert!(matches!(missing, Err(ServiceError::NotFound)));

        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();
        let no_reception = h.workflow.remove_last_product(&scope, point.id).await;
        assert!(matches!(no_reception, Err(ServiceError::NoOpenReception)));
    }

    #[tokio::test]
    async fn test_remove_only_touches_open_reception() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Казань")
            .await
            .unwrap();

        h.workflow.open_reception(&scope, point.id).await.unwrap();
        let archived = h
            .workflow
            .add_product(&scope, point.id, "электроника")
            .await
            .unwrap();
        h.workflow
            .close_last_reception(&scope, point.id)
            .await
            .unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();

        let result = h.workflow.remove_last_product(&scope, point.id).await;
        assert!(matches!(result, Err(ServiceError::NoProductsToDelete)));
        assert_eq!(h.store.products().await, vec![archived]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_remove_during_concurrent_adds_takes_only_the_latest() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();

        let mut seeded = Vec::new();
        for kind in ["электроника", "одежда", "обувь"] {
            seeded.push(h.workflow.add_product(&scope, point.id, kind).await.unwrap());
        }
        let newest_seeded = seeded.iter().map(|p| p.date_time).max().unwrap();

        let adds: Vec<_> = (0..8)
            .map(|_| {
                let workflow = h.workflow.clone();
                tokio::spawn(async move {
                    workflow
                        .add_product(&RequestScope::new(), point.id, "одежда")
                        .await
                })
            })
            .collect();
        let remove = {
            let workflow = h.workflow.clone();
            tokio::spawn(async move {
                workflow
                    .remove_last_product(&RequestScope::new(), point.id)
                    .await
            })
        };

        let mut added: HashSet<ProductId> = seeded.iter().map(|p| p.id).collect();
        for add in adds {
            added.insert(add.await.unwrap().unwrap().id);
        }
        let removed = remove.await.unwrap().unwrap();

        let remaining = h.store.products().await;
        let remaining_ids: HashSet<ProductId> = remaining.iter().map(|p| p.id).collect();
        assert_eq!(remaining.len(), 10);
        assert!(added.contains(&removed.id));
        assert!(!remaining_ids.contains(&removed.id));
        assert_eq!(added.len(), remaining_ids.len() + 1);
        assert!(remaining_ids.is_subset(&added));
        // Nothing committed before the race started can outrank the removed product.
        assert!(removed.date_time >= newest_seeded);
        assert!(
            seeded
                .iter()
                .filter(|p| p.id != removed.id)
                .all(|p| remaining_ids.contains(&p.id))
        );

        // Draining afterwards pops strictly from the top of the stack.
        let mut previous = None;
        for _ in 0..remaining.len() {
            let popped = h
                .workflow
                .remove_last_product(&scope, point.id)
                .await
                .unwrap();
            if let Some(previous) = previous {
                assert!(popped.date_time <= previous);
            }
            previous = Some(popped.date_time);
        }
        assert!(h.store.products().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_adds_racing_close_never_land_in_a_closed_reception() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Казань")
            .await
            .unwrap();
        let reception = h.workflow.open_reception(&scope, point.id).await.unwrap();

        let adds: Vec<_> = (0..10)
            .map(|_| {
                let workflow = h.workflow.clone();
                tokio::spawn(async move {
                    workflow
                        .add_product(&RequestScope::new(), point.id, "обувь")
                        .await
                })
            })
            .collect();
        let close = {
            let workflow = h.workflow.clone();
            tokio::spawn(async move {
                workflow
                    .close_last_reception(&RequestScope::new(), point.id)
                    .await
            })
        };

        let mut accepted = HashSet::new();
        for add in adds {
            match add.await.unwrap() {
                Ok(product) => {
                    assert_eq!(product.reception_id, reception.id);
                    accepted.insert(product.id);
                }
                Err(ServiceError::NoOpenReception) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        let closed = close.await.unwrap().unwrap();
        assert_eq!(closed.id, reception.id);
        assert_eq!(closed.status, ReceptionStatus::Closed);

        let products = h.store.products().await;
        let stored: HashSet<ProductId> = products.iter().map(|p| p.id).collect();
        assert_eq!(stored, accepted);
        assert!(products.iter().all(|p| p.reception_id == reception.id));

        let receptions = h.store.receptions().await;
        assert_eq!(receptions.len(), 1);
        assert!(!receptions[0].is_open());

        let late = h.workflow.add_product(&scope, point.id, "обувь").await;
        assert!(matches!(late, Err(ServiceError::NoOpenReception)));
        assert_eq!(h.store.products().await.len(), accepted.len());
    }
}
