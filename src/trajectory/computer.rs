use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinSet;

use super::types::{
    TrajectoryBatchReport, TrajectoryRecord, TRAJECTORY_POINTS, TRAJECTORY_STEP_SECONDS,
};
use crate::batch::{catch_record_panic, RecordFailure};
use crate::catalog::OrbitalElementRecord;
use crate::clock::Clock;
use crate::metrics::PipelineMetrics;
use crate::propagation::{PropagationEngine, PropagationError};
use crate::readiness::ReadinessGate;
use crate::store::{SharedCollection, StoreError};

type Computed = (OrbitalElementRecord, Result<TrajectoryRecord, PropagationError>);

/// Samples the ground track of one object from `start_time`, one point per minute.
pub fn compute_trajectory<E: PropagationEngine>(
    engine: &E,
    record: &OrbitalElementRecord,
    start_time: DateTime<Utc>,
) -> Result<TrajectoryRecord, PropagationError> {
    let propagator = engine.propagator(&record.line1, &record.line2)?;
    let step = Duration::seconds(TRAJECTORY_STEP_SECONDS);

    let mut points = Vec::with_capacity(TRAJECTORY_POINTS);
    let mut cursor = start_time;
    for _ in 0..TRAJECTORY_POINTS {
        points.push(engine.position_at(&propagator, cursor)?);
        cursor += step;
    }

    Ok(TrajectoryRecord {
        catalog_id: record.catalog_id,
        name: record.name.clone(),
        start_time,
        step_seconds: TRAJECTORY_STEP_SECONDS,
        points,
    })
}

pub struct TrajectoryComputer<E: PropagationEngine> {
    engine: Arc<E>,
    records: SharedCollection<OrbitalElementRecord>,
    trajectories: SharedCollection<TrajectoryRecord>,
    clock: Arc<dyn Clock>,
    gate: ReadinessGate,
    metrics: Arc<PipelineMetrics>,
    workers: usize,
}

impl<E: PropagationEngine> TrajectoryComputer<E> {
    pub fn new(
        engine: Arc<E>,
        records: SharedCollection<OrbitalElementRecord>,
        trajectories: SharedCollection<TrajectoryRecord>,
        clock: Arc<dyn Clock>,
        gate: ReadinessGate,
        metrics: Arc<PipelineMetrics>,
        workers: usize,
    ) -> Self {
        Self {
            engine,
            records,
            trajectories,
            clock,
            gate,
            metrics,
            workers: workers.max(1),
        }
    }

    /// Recomputes and stores the trajectory of every record.
    ///
    /// Only a failure to read the record set is returned as an error. Per-record
    /// propagation and store failures are logged and listed in the report, and the
    /// remaining records are still processed.
    pub async fn compute_and_store_all(&self) -> Result<TrajectoryBatchReport, StoreError> {
        let records = self.records.find_all()?;
        log::info!(
            "Computing trajectories for {} objects on {} workers",
            records.len(),
            self.workers
        );

        let mut report = TrajectoryBatchReport {
            total: records.len(),
            ..Default::default()
        };

        for (record, result) in self.compute_parallel(records).await {
            match result {
                Ok(trajectory) => match self.trajectories.upsert(&trajectory) {
                    Ok(()) => {
                        self.gate.mark_ready();
                        report.stored.push(record.catalog_id);
                    }
                    Err(e) => {
                        log::error!("Failed to store trajectory for {}: {}", record.name, e);
                        report.failures.push(RecordFailure::new(&record, e));
                    }
                },
                Err(e) => {
                    log::warn!("Failed to compute trajectory for {}: {}", record.name, e);
                    report.failures.push(RecordFailure::new(&record, e));
                }
            }
        }

        self.metrics
            .record_trajectory_run(report.stored.len(), report.failures.len());
        log::info!(
            "Stored {} trajectories, {} failed",
            report.stored.len(),
            report.failures.len()
        );
        Ok(report)
    }

    pub fn get_by_catalog_id(
        &self,
        catalog_id: u32,
    ) -> Result<Option<TrajectoryRecord>, StoreError> {
        self.trajectories.find(catalog_id)
    }

    /// Splits the snapshot into one chunk per worker and returns one result per record, in
    /// record order. Records of a worker that did not finish are reported as failed.
    async fn compute_parallel(&self, records: Vec<OrbitalElementRecord>) -> Vec<Computed> {
        if records.is_empty() {
            return Vec::new();
        }
        let chunk_size = records.len().div_ceil(self.workers);
        let chunks: Vec<Vec<OrbitalElementRecord>> =
            records.chunks(chunk_size).map(<[_]>::to_vec).collect();

        let mut tasks = JoinSet::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let chunk = chunk.clone();
            let engine = self.engine.clone();
            let clock = self.clock.clone();
            tasks.spawn_blocking(move || {
                let computed: Vec<Computed> = chunk
                    .into_iter()
                    .map(|record| {
                        let start_time = clock.now();
                        let result = catch_record_panic(|| {
                            compute_trajectory(engine.as_ref(), &record, start_time)
                        });
                        (record, result)
                    })
                    .collect();
                (index, computed)
            });
        }

        let mut parts: Vec<Option<Vec<Computed>>> = chunks.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, part)) => parts[index] = Some(part),
                Err(e) => log::error!("Trajectory worker failed: {}", e),
            }
        }

        chunks
            .into_iter()
            .zip(parts)
            .flat_map(|(chunk, part)| {
                part.unwrap_or_else(|| {
                    chunk
                        .into_iter()
                        .map(|record| {
                            let reason = "worker did not finish".to_string();
                            (record, Err(PropagationError::Propagation(reason)))
                        })
                        .collect()
                })
            })
            .collect()
    }
}
