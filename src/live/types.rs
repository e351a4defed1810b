use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::batch::RecordFailure;
use crate::propagation::GeodeticPosition;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LivePositionSnapshot {
    pub catalog_id: u32,
    pub name: String,
    pub position: GeodeticPosition,
}

/// Pure result of one cycle's computation, before any side effects.
#[derive(Debug, Clone)]
pub struct LiveBatch {
    pub computed_at: DateTime<Utc>,
    pub snapshots: Vec<LivePositionSnapshot>,
    pub failures: Vec<RecordFailure>,
}

/// Cache value, kept compact: `{"name":..,"lat":..,"lon":..,"alt":..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CachedPosition {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl From<&LivePositionSnapshot> for CachedPosition {
    fn from(snapshot: &LivePositionSnapshot) -> Self {
        CachedPosition {
            name: snapshot.name.clone(),
            lat: round_to(snapshot.position.latitude_deg, 6),
            lon: round_to(snapshot.position.longitude_deg, 6),
            alt: round_to(snapshot.position.altitude_km, 2),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CycleSummary {
    pub cycle: u64,
    pub published: usize,
    pub failed: usize,
    pub receivers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// No trajectory has been stored yet.
    NotReady,
    /// Another cycle was still running.
    Busy,
    /// The record set could not be read.
    Failed { reason: String },
    Completed { summary: CycleSummary },
}
