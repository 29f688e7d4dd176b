use pvz_core::{City, PickupPointId};

use super::{Workflow, now};
use crate::db::Page;
use crate::models::{DateRange, PickupPoint, PickupPointSummary, ReceptionSummary};
use crate::services::{RequestScope, ServiceError};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 30;

impl Workflow {
    /// Register a new pickup point in `city`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidInput` if `city` is not a served city.
    #[tracing::instrument(skip(self, scope))]
    pub async fn create_pickup_point(
        &self,
        scope: &RequestScope,
        city: &str,
    ) -> Result<PickupPoint, ServiceError> {
        let city: City = city
            .parse()
            .map_err(|_| ServiceError::InvalidInput("invalid city"))?;

        let point = scope
            .run(async {
                let point = PickupPoint {
                    id: PickupPointId::generate(),
                    registration_date: now(),
                    city,
                };

                let mut tx = self.store.begin().await?;
                tx.create_pickup_point(&point).await?;
                tx.commit().await?;
                Ok::<_, ServiceError>(point)
            })
            .await?;

        self.metrics.pickup_point_created();
        tracing::info!(pvz_id = %point.id, city = %point.city, "pickup point created");
        Ok(point)
    }

    /// List pickup points with their receptions and products, newest first.
    ///
    /// `page` is 1-based; `page_size` must be between 1 and [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidInput` for an out-of-range page or page size.
    #[tracing::instrument(skip(self, scope))]
    pub async fn list_pickup_points(
        &self,
        scope: &RequestScope,
        range: DateRange,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<PickupPointSummary>, ServiceError> {
        if page == 0 {
            return Err(ServiceError::InvalidInput("invalid page"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ServiceError::InvalidInput("invalid page size"));
        }
        let page = Page {
            number: page,
            size: page_size,
        };

        scope
            .run(async {
                let mut tx = self.store.begin().await?;
                let points = tx.list_pickup_points(range, page).await?;

                let mut summaries = Vec::with_capacity(points.len());
                for pvz in points {
                    let receptions = tx.list_receptions_by_pickup_point(pvz.id).await?;

                    let mut nested = Vec::with_capacity(receptions.len());
                    for reception in receptions {
                        let products = tx.list_products_by_reception(reception.id).await?;
                        nested.push(ReceptionSummary {
                            reception,
                            products,
                        });
                    }

                    summaries.push(PickupPointSummary {
                        pvz,
                        receptions: nested,
                    });
                }

                // Read-only; commit just releases the snapshot.
                tx.commit().await?;
                Ok::<_, ServiceError>(summaries)
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use pvz_core::ReceptionStatus;

    use super::super::test_support::harness;
    use super::*;

    #[tokio::test]
    async fn test_create_pickup_point() {
        let h = harness();
        let scope = RequestScope::new();

        let point = h
            .workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();

        assert_eq!(point.city, City::Moscow);
        assert!(h.metrics.render().unwrap().contains("pvz_created_total 1"));
    }

    #[tokio::test]
    async fn test_create_pickup_point_rejects_unknown_city() {
        let h = harness();
        let result = h
            .workflow
            .create_pickup_point(&RequestScope::new(), "Новосибирск")
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::InvalidInput("invalid city"))
        ));
        assert!(h.metrics.render().unwrap().contains("pvz_created_total 0"));
    }

    #[tokio::test]
    async fn test_list_validates_paging() {
        let h = harness();
        let scope = RequestScope::new();
        let range = DateRange::default();

        assert!(matches!(
            h.workflow.list_pickup_points(&scope, range, 0, 10).await,
            Err(ServiceError::InvalidInput("invalid page"))
        ));
        assert!(matches!(
            h.workflow.list_pickup_points(&scope, range, 1, 0).await,
            Err(ServiceError::InvalidInput("invalid page size"))
        ));
        assert!(matches!(
            h.workflow.list_pickup_points(&scope, range, 1, 31).await,
            Err(ServiceError::InvalidInput("invalid page size"))
        ));
        assert!(
            h.workflow
                .list_pickup_points(&scope, range, 1, MAX_PAGE_SIZE)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let h = harness();
        let scope = RequestScope::new();

        let mut created = Vec::new();
        for city in ["Москва", "Казань", "Санкт-Петербург"] {
            created.push(h.workflow.create_pickup_point(&scope, city).await.unwrap());
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let first = h
            .workflow
            .list_pickup_points(&scope, DateRange::default(), 1, 2)
            .await
            .unwrap();
        let second = h
            .workflow
            .list_pickup_points(&scope, DateRange::default(), 2, 2)
            .await
            .unwrap();

        let ids: Vec<_> = first.iter().chain(&second).map(|s| s.pvz.id).collect();
        let expected: Vec<_> = created.iter().rev().map(|p| p.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_list_nests_receptions_and_products() {
        let h = harness();
        let scope = RequestScope::new();

        let point = h
            .workflow
            .create_pickup_point(&scope, "Казань")
            .await
            .unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();
        h.workflow
            .add_product(&scope, point.id, "обувь")
            .await
            .unwrap();
        h.workflow.close_last_reception(&scope, point.id).await.unwrap();
        h.workflow.open_reception(&scope, point.id).await.unwrap();

        let listed = h
            .workflow
            .list_pickup_points(&scope, DateRange::default(), 1, 10)
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        let receptions = &listed[0].receptions;
        assert_eq!(receptions.len(), 2);
        assert_eq!(receptions[0].reception.status, ReceptionStatus::Closed);
        assert_eq!(receptions[0].products.len(), 1);
        assert_eq!(receptions[1].reception.status, ReceptionStatus::Open);
        assert!(receptions[1].products.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_registration_date() {
        let h = harness();
        let scope = RequestScope::new();

        h.workflow
            .create_pickup_point(&scope, "Москва")
            .await
            .unwrap();

        let future = DateRange {
            start: Some(Utc::now() + chrono::Duration::hours(1)),
            end: None,
        };
        let listed = h
            .workflow
            .list_pickup_points(&scope, future, 1, 10)
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
