//! Product domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pvz_core::{ProductId, ProductType, ReceptionId};

/// A product accepted during a reception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub product_type: ProductType,
    pub reception_id: ReceptionId,
}
