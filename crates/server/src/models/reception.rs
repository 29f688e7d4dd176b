//! Reception domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pvz_core::{PickupPointId, ReceptionId, ReceptionStatus};

/// A timed work session at a pickup point.
///
/// Products may only be added or removed while the reception is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reception {
    pub id: ReceptionId,
    pub date_time: DateTime<Utc>,
    pub pvz_id: PickupPointId,
    pub status: ReceptionStatus,
}

impl Reception {
    /// Returns `true` while the reception accepts products.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status.is_open()
    }
}
