//! Pickup point / reception / product lifecycle.
//!
//! Each operation opens one transaction, performs every guarding read and
//! the write against it, and commits. Business counters are bumped only
//! after a successful commit.
//!
//! Reception state machine: `in_progress --close--> close` (terminal).

mod pickup_points;
mod products;
mod receptions;

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use super::ServiceError;
use crate::db::{RepositoryError, Store};
use crate::metrics::BusinessMetrics;

pub use pickup_points::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// The workflow engine.
///
/// Stateless apart from its collaborators, so one instance serves every
/// request.
#[derive(Clone)]
pub struct Workflow {
    store: Arc<dyn Store>,
    metrics: Arc<dyn BusinessMetrics>,
}

impl Workflow {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, metrics: Arc<dyn BusinessMetrics>) -> Self {
        Self { store, metrics }
    }
}

/// Current time at the precision the database stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A missing pickup point is a domain error; anything else is internal.
fn pickup_point_lookup(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound,
        other => other.into(),
    }
}

fn open_reception_lookup(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NoOpenReception,
        other => other.into(),
    }
}
