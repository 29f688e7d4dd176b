use async_trait::async_trait;

use pvz_core::{PickupPointId, ReceptionId, ReceptionStatus};

use super::PgTransaction;
use crate::db::{ReceptionStore, RepositoryError};
use crate::models::Reception;

#[async_trait]
impl ReceptionStore for PgTransaction {
    async fn create_reception(&mut self, reception: &Reception) -> Result<(), RepositoryError> {
        // A second open reception trips receptions_one_open_per_pvz.
        sqlx::query(
            r"
            INSERT INTO receptions (id, date_time, pvz_id, status)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(reception.id)
        .bind(reception.date_time)
        .bind(reception.pvz_id)
        .bind(reception.status)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "open reception already exists"))?;

        Ok(())
    }

    async fn get_open_reception_by_pickup_point(
        &mut self,
        pickup_point: PickupPointId,
    ) -> Result<Reception, RepositoryError> {
        sqlx::query_as::<_, Reception>(
            r"
            SELECT id, date_time, pvz_id, status
            FROM receptions
            WHERE pvz_id = $1 AND status = $2
            FOR UPDATE
            ",
        )
        .bind(pickup_point)
        .bind(ReceptionStatus::Open)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn update_reception_status(
        &mut self,
        id: ReceptionId,
        status: ReceptionStatus,
    ) -> Result<Reception, RepositoryError> {
        sqlx::query_as::<_, Reception>(
            r"
            UPDATE receptions
            SET status = $2
            WHERE id = $1
            RETURNING id, date_time, pvz_id, status
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn list_receptions_by_pickup_point(
        &mut self,
        pickup_point: PickupPointId,
    ) -> Result<Vec<Reception>, RepositoryError> {
        let receptions = sqlx::query_as::<_, Reception>(
            r"
            SELECT id, date_time, pvz_id, status
            FROM receptions
            WHERE pvz_id = $1
            ORDER BY date_time
            ",
        )
        .bind(pickup_point)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(receptions)
    }
}
