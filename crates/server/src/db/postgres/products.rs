use async_trait::async_trait;

use pvz_core::{ProductId, ReceptionId};

use super::PgTransaction;
use crate::db::{ProductStore, RepositoryError};
use crate::models::Product;

#[async_trait]
impl ProductStore for PgTransaction {
    async fn create_product(&mut self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, date_time, "type", reception_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id)
        .bind(product.date_time)
        .bind(product.product_type)
        .bind(product.reception_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "product already exists"))?;

        Ok(())
    }

    async fn get_most_recent_product_by_reception(
        &mut self,
        reception: ReceptionId,
    ) -> Result<Product, RepositoryError> {
        // seq is a tie-breaker for equal timestamps.
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, date_time, "type", reception_id
            FROM products
            WHERE reception_id = $1
            ORDER BY date_time DESC, seq DESC
            LIMIT 1
            "#,
        )
        .bind(reception)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete_product_by_id(&mut self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_products_by_reception(
        &mut self,
        reception: ReceptionId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, date_time, "type", reception_id
            FROM products
            WHERE reception_id = $1
            ORDER BY date_time, seq
            "#,
        )
        .bind(reception)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(products)
    }
}
