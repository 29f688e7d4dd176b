//! Pickup point (PVZ) domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pvz_core::{City, PickupPointId};

use super::{Product, Reception};

/// A physical pickup point.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub registration_date: DateTime<Utc>,
    pub city: City,
}

/// Inclusive filter on a pickup point's registration date.
///
/// Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Returns `true` if `at` falls within both bounds.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

/// A pickup point together with its full reception history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickupPointSummary {
    pub pvz: PickupPoint,
    pub receptions: Vec<ReceptionSummary>,
}

/// A reception together with every product it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceptionSummary {
    pub reception: Reception,
    pub products: Vec<Product>,
}
