use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::OrbitalElementRecord;
use crate::propagation::PropagationError;

/// A record that was skipped by a batch computation, and why.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordFailure {
    pub catalog_id: u32,
    pub name: String,
    pub reason: String,
}

impl RecordFailure {
    pub fn new(record: &OrbitalElementRecord, reason: impl ToString) -> Self {
        RecordFailure {
            catalog_id: record.catalog_id,
            name: record.name.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Runs one record's computation so that a panic fails that record only.
pub fn catch_record_panic<T>(
    compute: impl FnOnce() -> Result<T, PropagationError>,
) -> Result<T, PropagationError> {
    panic::catch_unwind(AssertUnwindSafe(compute)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        Err(PropagationError::Propagation(format!(
            "propagator panicked: {}",
            message
        )))
    })
}
