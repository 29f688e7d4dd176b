use async_trait::async_trait;

use pvz_core::PickupPointId;

use super::PgTransaction;
use crate::db::{Page, PickupPointStore, RepositoryError};
use crate::models::{DateRange, PickupPoint};

#[async_trait]
impl PickupPointStore for PgTransaction {
    async fn create_pickup_point(&mut self, point: &PickupPoint) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO pvzs (id, registration_date, city)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(point.id)
        .bind(point.registration_date)
        .bind(point.city)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "pvz already exists"))?;

        Ok(())
    }

    async fn get_pickup_point_by_id(
        &mut self,
        id: PickupPointId,
    ) -> Result<PickupPoint, RepositoryError> {
        sqlx::query_as::<_, PickupPoint>(
            r"
            SELECT id, registration_date, city
            FROM pvzs
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn list_pickup_points(
        &mut self,
        range: DateRange,
        page: Page,
    ) -> Result<Vec<PickupPoint>, RepositoryError> {
        let points = sqlx::query_as::<_, PickupPoint>(
            r"
            SELECT id, registration_date, city
            FROM pvzs
            WHERE ($1::timestamptz IS NULL OR registration_date >= $1)
              AND ($2::timestamptz IS NULL OR registration_date <= $2)
            ORDER BY registration_date DESC, id
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(points)
    }
}
