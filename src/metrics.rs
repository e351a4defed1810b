use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use utoipa::ToSchema;

/// Process-wide counters, owned by the pipeline and shared with the components that bump them.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    ingests: AtomicU64,
    records_ingested: AtomicU64,
    trajectory_runs: AtomicU64,
    trajectories_stored: AtomicU64,
    trajectory_failures: AtomicU64,
    live_cycles: AtomicU64,
    live_cycles_not_ready: AtomicU64,
    live_cycles_busy: AtomicU64,
    positions_published: AtomicU64,
    live_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub ingests: u64,
    pub records_ingested: u64,
    pub trajectory_runs: u64,
    pub trajectories_stored: u64,
    pub trajectory_failures: u64,
    pub live_cycles: u64,
    pub live_cycles_not_ready: u64,
    pub live_cycles_busy: u64,
    pub positions_published: u64,
    pub live_failures: u64,
}

impl PipelineMetrics {
    pub fn record_ingest(&self, records: usize) {
        self.ingests.fetch_add(1, Ordering::Relaxed);
        self.records_ingested
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn record_trajectory_run(&self, stored: usize, failed: usize) {
        self.trajectory_runs.fetch_add(1, Ordering::Relaxed);
        self.trajectories_stored
            .fetch_add(stored as u64, Ordering::Relaxed);
        self.trajectory_failures
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    /// Counts a completed live cycle and returns its sequence number, starting at 1.
    pub fn record_live_cycle(&self, published: usize, failed: usize) -> u64 {
        self.positions_published
            .fetch_add(published as u64, Ordering::Relaxed);
        self.live_failures.fetch_add(failed as u64, Ordering::Relaxed);
        self.live_cycles.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_not_ready(&self) {
        self.live_cycles_not_ready.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_busy(&self) {
        self.live_cycles_busy.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingests: self.ingests.load(Ordering::Relaxed),
            records_ingested: self.records_ingested.load(Ordering::Relaxed),
            trajectory_runs: self.trajectory_runs.load(Ordering::Relaxed),
            trajectories_stored: self.trajectories_stored.load(Ordering::Relaxed),
            trajectory_failures: self.trajectory_failures.load(Ordering::Relaxed),
            live_cycles: self.live_cycles.load(Ordering::Relaxed),
            live_cycles_not_ready: self.live_cycles_not_ready.load(Ordering::Relaxed),
            live_cycles_busy: self.live_cycles_busy.load(Ordering::Relaxed),
            positions_published: self.positions_published.load(Ordering::Relaxed),
            live_failures: self.live_failures.load(Ordering::Relaxed),
        }
    }
}
