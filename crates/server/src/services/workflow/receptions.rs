use pvz_core::{PickupPointId, ReceptionId, ReceptionStatus};

use super::{Workflow, now, open_reception_lookup, pickup_point_lookup};
use crate::db::RepositoryError;
use crate::models::Reception;
use crate::services::{RequestScope, ServiceError};

impl Workflow {
    /// Open a reception at `pvz_id`.
    ///
    /// The existence check, the open-reception check and the insert share a
    /// transaction; the store's uniqueness constraint settles concurrent
    /// opens that both pass the check.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the pickup point does not exist
    /// - `ServiceError::ConflictAlreadyOpen` if it already has an open reception
    #[tracing::instrument(skip(self, scope))]
    pub async fn open_reception(
        &self,
        scope: &RequestScope,
        pvz_id: PickupPointId,
    ) -> Result<Reception, ServiceError> {
        let reception = scope
            .run(async {
                let mut tx = self.store.begin().await?;
                tx.get_pickup_point_by_id(pvz_id)
                    .await
                    .map_err(pickup_point_lookup)?;

                match tx.get_open_reception_by_pickup_point(pvz_id).await {
                    Ok(open) => {
                        tracing::debug!(reception_id = %open.id, "reception already open");
                        return Err(ServiceError::ConflictAlreadyOpen);
                    }
                    Err(RepositoryError::NotFound) => {}
                    Err(e) => return Err(e.into()),
                }

                let reception = Reception {
                    id: ReceptionId::generate(),
                    date_time: now(),
                    pvz_id,
                    status: ReceptionStatus::Open,
                };
                tx.create_reception(&reception)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::Conflict(_) => ServiceError::ConflictAlreadyOpen,
                        other => other.into(),
                    })?;
                tx.commit().await?;
                Ok::<_, ServiceError>(reception)
            })
            .await?;

        self.metrics.reception_created();
        tracing::info!(pvz_id = %pvz_id, reception_id = %reception.id, "reception opened");
        Ok(reception)
    }

    /// Close the open reception at `pvz_id`. Closing is not idempotent.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the pickup point does not exist
    /// - `ServiceError::NoOpenReception` if no reception is open
    #[tracing::instrument(skip(self, scope))]
    pub async fn close_last_reception(
        &self,
        scope: &RequestScope,
        pvz_id: PickupPointId,
    ) -> Result<Reception, ServiceError> {
        let reception = scope
            .run(async {
                let mut tx = self.store.begin().await?;
                tx.get_pickup_point_by_id(pvz_id)
                    .await
                    .map_err(pickup_point_lookup)?;

                let open = tx
                    .get_open_reception_by_pickup_point(pvz_id)
                    .await
                    .map_err(open_reception_lookup)?;
                if !open.status.can_transition_to(ReceptionStatus::Closed) {
                    return Err(ServiceError::NoOpenReception);
                }

                let closed = tx
                    .update_reception_status(open.id, ReceptionStatus::Closed)
                    .await?;
                tx.commit().await?;
                Ok::<_, ServiceError>(closed)
            })
            .await?;

        tracing::info!(pvz_id = %pvz_id, reception_id = %reception.id, "reception closed");
        Ok(reception)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::test_support::harness;
    use super::*;

    #[tokio::test]
    async fn test_open_reception() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();

        let reception = h.workflow.open_reception(&scope, point.id).await.unwrap();

        assert_eq!(reception.pvz_id, point.id);
        assert!(reception.is_open());
        assert!(
            h.metrics
                .render()
                .unwrap()
                .contains("reception_created_total 1")
        );
    }

    #[tokio::test]
    async fn test_open_reception_unknown_pickup_point() {
        let h = harness();
        let result = h
            .workflow
            .open_reception(&RequestScope::new(), PickupPointId::generate())
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_second_open_conflicts() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Казань")
            .await
            .unwrap();

        h.workflow.open_reception(&scope, point.id).await.unwrap();
        let second = h.workflow.open_reception(&scope, point.id).await;

        assert!(matches!(second, Err(ServiceError::ConflictAlreadyOpen)));
        assert_eq!(h.store.receptions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_close_then_reopen() {
        let h = harness();
        let scope = RequestScope::new();
        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();

        let opened = h.workflow.open_reception(&scope, point.id).await.unwrap();
        let closed = h
            .workflow
            .close_last_reception(&scope, point.id)
            .await
            .unwrap();
        assert_eq!(closed.id, opened.id);
        assert_eq!(closed.status, ReceptionStatus::Closed);

        let reopened = h.workflow.open_reception(&scope, point.id).await.unwrap();
        assert_ne!(reopened.id, opened.id);
    }

    #[tokio::test]
    async fn test_close_is_not_idempotent() {
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

        let again = h.workflow.close_last_reception(&scope, point.id).await;
        assert!(matches!(again, Err(ServiceError::NoOpenReception)));
    }

    #[tokio::test]
    async fn test_close_distinguishes_missing_pickup_point() {
        let h = harness();
        let result = h
            .workflow
            .close_last_reception(&RequestScope::new(), PickupPointId::generate())
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_opens_admit_exactly_one() {
        let h = harness();
        let point = h
            .workflow
            .create_pickup_point(&RequestScope::new(), "Санкт-Петербург")
            .await
            .unwrap();
        let workflow = Arc::new(h.workflow.clone());

        let attempts: Vec<_> = (0..10)
            .map(|_| {
                let workflow = Arc::clone(&workflow);
                tokio::spawn(async move {
                    workflow
                        .open_reception(&RequestScope::new(), point.id)
                        .await
                })
            })
            .collect();

        let mut opened = 0;
        let mut conflicts = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => opened += 1,
                Err(ServiceError::ConflictAlreadyOpen) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(opened, 1);
        assert_eq!(conflicts, 9);
        let open_count = h
            .store
            .receptions()
            .await
            .iter()
            .filter(|r| r.is_open())
            .count();
        assert_eq!(open_count, 1);
    }

    #[tokio::test]
    async fn test_timeout_leaves_no_reception() {
        let h = harness();
        let point = h
            .workflow
            .create_pickup_point(&RequestScope::new(), "Москва")
            .await
            .unwrap();

        let lock = h.store.lock().await;
        let scope = RequestScope::with_timeout(Duration::from_millis(20));
        let result = h.workflow.open_reception(&scope, point.id).await;
        drop(lock);

        assert!(matches!(result, Err(ServiceError::Timeout)));
        assert!(h.store.receptions().await.is_empty());
        assert!(
            h.metrics
                .render()
                .unwrap()
                .contains("reception_created_total 0")
        );
    }

    #[tokio::test]
    async fn test_cancelled_scope_surfaces_cancellation() {
        let h = harness();
        let point = h
            .workflow
            .create_pickup_point(&RequestScope::new(), "Москва")
            .await
            .unwrap();

        let scope = RequestScope::new();
        scope.cancel_token().cancel();
        let result = h.workflow.open_reception(&scope, point.id).await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
        assert!(h.store.receptions().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let h = harness();
        h.store.set_unavailable(true);

        let result = h
            .workflow
            .open_reception(&RequestScope::new(), PickupPointId::generate())
            .await;

        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }
}
