use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::batch::RecordFailure;
use crate::propagation::GeodeticPosition;
use crate::store::Document;

/// Points per trajectory: now plus 90 one-minute steps.
pub const TRAJECTORY_POINTS: usize = 91;
pub const TRAJECTORY_STEP_SECONDS: i64 = 60;

/// Precomputed ground track. Point `i` lies at `start_time + i * step_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrajectoryRecord {
    pub catalog_id: u32,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub step_seconds: i64,
    pub points: Vec<GeodeticPosition>,
}

impl TrajectoryRecord {
    pub fn epoch_of(&self, index: usize) -> DateTime<Utc> {
        self.start_time + Duration::seconds(self.step_seconds * index as i64)
    }
}

impl Document for TrajectoryRecord {
    const COLLECTION: &'static str = "trajectories";

    fn key(&self) -> u32 {
        self.catalog_id
    }
}

/// Outcome of one trajectory batch.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct TrajectoryBatchReport {
    pub total: usize,
    pub stored: Vec<u32>,
    pub failures: Vec<RecordFailure>,
}
