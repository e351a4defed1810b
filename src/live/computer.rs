use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::types::{CachedPosition, CycleOutcome, CycleSummary, LiveBatch, LivePositionSnapshot};
use crate::batch::{catch_record_panic, RecordFailure};
use crate::broadcast::{BroadcastHub, PositionBroadcast, POSITIONS_TOPIC};
use crate::cache::PositionCache;
use crate::catalog::OrbitalElementRecord;
use crate::clock::Clock;
use crate::metrics::PipelineMetrics;
use crate::propagation::{PropagationEngine, PropagationError};
use crate::readiness::ReadinessGate;
use crate::store::SharedCollection;

pub fn cache_key(name: &str) -> String {
    format!("sat:{}", name)
}

/// Computes every record's position at `now`. Failing records, panics included, are listed,
/// not fatal.
pub fn compute_snapshots<E: PropagationEngine>(
    engine: &E,
    records: &[OrbitalElementRecord],
    now: DateTime<Utc>,
) -> LiveBatch {
    let mut snapshots = Vec::with_capacity(records.len());
    let mut failures = Vec::new();

    for record in records {
        match catch_record_panic(|| snapshot_at(engine, record, now)) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                log::warn!("Failed to compute position for {}: {}", record.name, e);
                failures.push(RecordFailure::new(record, e));
            }
        }
    }

    LiveBatch {
        computed_at: now,
        snapshots,
        failures,
    }
}

fn snapshot_at<E: PropagationEngine>(
    engine: &E,
    record: &OrbitalElementRecord,
    now: DateTime<Utc>,
) -> Result<LivePositionSnapshot, PropagationError> {
    let propagator = engine.propagator(&record.line1, &record.line2)?;
    let position = engine.position_at(&propagator, now)?;
    Ok(LivePositionSnapshot {
        catalog_id: record.catalog_id,
        name: record.name.clone(),
        position,
    })
}

pub struct LivePositionComputer<E: PropagationEngine> {
    engine: Arc<E>,
    records: SharedCollection<OrbitalElementRecord>,
    cache: Arc<dyn PositionCache>,
    hub: BroadcastHub,
    clock: Arc<dyn Clock>,
    gate: ReadinessGate,
    metrics: Arc<PipelineMetrics>,
    cache_ttl: Duration,
    in_flight: Mutex<()>,
}

impl<E: PropagationEngine> LivePositionComputer<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<E>,
        records: SharedCollection<OrbitalElementRecord>,
        cache: Arc<dyn PositionCache>,
        hub: BroadcastHub,
        clock: Arc<dyn Clock>,
        gate: ReadinessGate,
        metrics: Arc<PipelineMetrics>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            engine,
            records,
            cache,
            hub,
            clock,
            gate,
            metrics,
            cache_ttl,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs one cycle unless the gate is closed or another cycle is in flight.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.gate.is_ready() {
            log::info!("No trajectories computed yet, skipping live positions");
            self.metrics.record_not_ready();
            return CycleOutcome::NotReady;
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            log::warn!("Previous live position cycle still running, skipping");
            self.metrics.record_busy();
            return CycleOutcome::Busy;
        };

        let records = match self.records.find_all() {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to read element records: {}", e);
                return CycleOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let now = self.clock.now();
        let engine = self.engine.clone();
        let batch = match tokio::task::spawn_blocking(move || {
            compute_snapshots(engine.as_ref(), &records, now)
        })
        .await
        {
            Ok(batch) => batch,
            Err(e) => {
                log::error!("Live position worker failed: {}", e);
                return CycleOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        CycleOutcome::Completed {
            summary: self.disseminate(batch),
        }
    }

    /// Writes every snapshot to the cache, then broadcasts the batch as one message.
    pub fn disseminate(&self, batch: LiveBatch) -> CycleSummary {
        self.cache.purge_expired();
        for snapshot in &batch.snapshots {
            match serde_json::to_string(&CachedPosition::from(snapshot)) {
                Ok(value) => {
                    self.cache
                        .set_with_ttl(&cache_key(&snapshot.name), value, self.cache_ttl)
                }
                Err(e) => log::error!("Failed to encode position of {}: {}", snapshot.name, e),
            }
        }

        let published = batch.snapshots.len();
        let failed = batch.failures.len();
        let cycle = self.metrics.record_live_cycle(published, failed);

        let receivers = self.hub.publish(PositionBroadcast {
            topic: POSITIONS_TOPIC.to_string(),
            cycle,
            computed_at: batch.computed_at,
            positions: batch.snapshots,
        });

        log::info!(
            "Broadcast cycle {}: {} positions to {} subscribers ({} failed)",
            cycle,
            published,
            receivers,
            failed
        );

        CycleSummary {
            cycle,
            published,
            failed,
            receivers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::clock::FixedClock;
    use crate::propagation::fake::FakeEngine;
    use crate::store::MemoryCollection;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        computer: Arc<LivePositionComputer<FakeEngine>>,
        records: SharedCollection<OrbitalElementRecord>,
        cache: Arc<MemoryCache>,
        hub: BroadcastHub,
        gate: ReadinessGate,
        metrics: Arc<PipelineMetrics>,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(catalog_id: u32, name: &str, line1: &str) -> OrbitalElementRecord {
        OrbitalElementRecord {
            catalog_id,
            name: name.into(),
            line1: line1.into(),
            line2: format!("2 {:05}", catalog_id),
        }
    }

    fn fixture() -> Fixture {
        let records: SharedCollection<OrbitalElementRecord> = Arc::new(MemoryCollection::new());
        let cache = Arc::new(MemoryCache::new());
        let hub = BroadcastHub::new(8);
        let gate = ReadinessGate::new();
        let metrics = Arc::new(PipelineMetrics::default());
        let computer = Arc::new(LivePositionComputer::new(
            Arc::new(FakeEngine::default()),
            records.clone(),
            cache.clone(),
            hub.clone(),
            Arc::new(FixedClock(now())),
            gate.clone(),
            metrics.clone(),
            Duration::from_secs(45),
        ));
        Fixture {
            computer,
            records,
            cache,
            hub,
            gate,
            metrics,
        }
    }

    #[test]
    fn snapshots_use_one_instant_and_skip_failures() {
        let engine = FakeEngine::default();
        let records = vec![
            record(1, "ONE", "1 00001U"),
            record(2, "TWO", "1 BAD"),
            record(3, "THREE", "1 00003U"),
        ];

        let batch = compute_snapshots(&engine, &records, now());

        assert_eq!(batch.computed_at, now());
        let ids: Vec<u32> = batch.snapshots.iter().map(|s| s.catalog_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(batch.failures[0].name, "TWO");
        assert!(engine
            .requests
            .lock()
            .unwrap()
            .iter()
            .all(|(_, at)| *at == now()));
        assert!((batch.snapshots[0].position.altitude_km - 500.0).abs() < 1e-6);
    }

    #[test]
    fn panicking_record_does_not_sink_the_batch() {
        let engine = FakeEngine::default();
        let records = vec![
            record(1, "ONE", "1 00001U"),
            record(2, "EXPLODES", "1 PANIC"),
            record(3, "THREE", "1 00003U"),
        ];

        let batch = compute_snapshots(&engine, &records, now());

        assert_eq!(batch.snapshots.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].catalog_id, 2);
    }

    #[tokio::test]
    async fn closed_gate_means_no_cache_writes_and_no_broadcast() {
        let f = fixture();
        f.records.upsert(&record(1, "ONE", "1 00001U")).unwrap();
        let mut rx = f.hub.subscribe();

        assert_eq!(f.computer.run_cycle().await, CycleOutcome::NotReady);

        assert!(f.cache.is_empty());
        assert!(rx.try_recv().is_err());
        assert_eq!(f.metrics.snapshot().live_cycles, 0);
        assert_eq!(f.metrics.snapshot().live_cycles_not_ready, 1);
    }

    #[tokio::test]
    async fn open_gate_caches_and_broadcasts_whole_batch() {
        let f = fixture();
        f.records
            .upsert_all(&[
                record(1, "ONE", "1 00001U"),
                record(2, "BROKEN", "1 BAD"),
                record(3, "THREE", "1 00003U"),
            ])
            .unwrap();
        let mut rx = f.hub.subscribe();
        f.gate.mark_ready();

        let outcome = f.computer.run_cycle().await;
        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                summary: CycleSummary {
                    cycle: 1,
                    published: 2,
                    failed: 1,
                    receivers: 1,
                }
            }
        );

        let message = rx.recv().await.unwrap();
        assert_eq!(message.topic, POSITIONS_TOPIC);
        assert_eq!(message.computed_at, now());
        assert_eq!(message.positions.len(), 2);

        let cached: CachedPosition =
            serde_json::from_str(&f.cache.get("sat:ONE").unwrap()).unwrap();
        assert_eq!(cached.name, "ONE");
        assert!((cached.alt - 500.0).abs() < 0.01);
        assert!(f.cache.get("sat:BROKEN").is_none());
    }

    #[tokio::test]
    async fn cache_value_is_compact_json() {
        let f = fixture();
        f.computer.disseminate(LiveBatch {
            computed_at: now(),
            snapshots: vec![LivePositionSnapshot {
                catalog_id: 25544,
                name: "ISS (ZARYA)".into(),
                position: crate::propagation::GeodeticPosition {
                    latitude_deg: 12.345_678_91,
                    longitude_deg: -45.5,
                    altitude_km: 417.126,
                },
            }],
            failures: Vec::new(),
        });

        assert_eq!(
            f.cache.get("sat:ISS (ZARYA)").unwrap(),
            r#"{"name":"ISS (ZARYA)","lat":12.345679,"lon":-45.5,"alt":417.13}"#
        );
    }

    #[derive(Default)]
    struct CountingCache {
        inner: MemoryCache,
        writes: AtomicUsize,
        purges: AtomicUsize,
    }

    impl PositionCache for CountingCache {
        fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) {
            self.writes.fetch_add(1, Ordering::Relaxed);
            self.inner.set_with_ttl(key, value, ttl);
        }

        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn purge_expired(&self) {
            self.purges.fetch_add(1, Ordering::Relaxed);
            self.inner.purge_expired();
        }
    }

    #[tokio::test]
    async fn expired_entries_are_purged_once_per_cycle() {
        let records: SharedCollection<OrbitalElementRecord> = Arc::new(MemoryCollection::new());
        records
            .upsert_all(&[
                record(1, "ONE", "1 00001U"),
                record(2, "TWO", "1 00002U"),
                record(3, "THREE", "1 00003U"),
            ])
            .unwrap();
        let cache = Arc::new(CountingCache::default());
        let gate = ReadinessGate::new();
        gate.mark_ready();
        let computer = LivePositionComputer::new(
            Arc::new(FakeEngine::default()),
            records,
            cache.clone(),
            BroadcastHub::new(4),
            Arc::new(FixedClock(now())),
            gate,
            Arc::new(PipelineMetrics::default()),
            Duration::from_secs(45),
        );

        computer.run_cycle().await;
        computer.run_cycle().await;

        assert_eq!(cache.writes.load(Ordering::Relaxed), 6);
        assert_eq!(cache.purges.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn overlapping_cycle_is_refused() {
        let f = fixture();
        f.gate.mark_ready();
        let mut rx = f.hub.subscribe();

        let _running = f.computer.in_flight.lock().await;
        assert_eq!(f.computer.run_cycle().await, CycleOutcome::Busy);
        assert!(rx.try_recv().is_err());
        assert_eq!(f.metrics.snapshot().live_cycles_busy, 1);
    }
}
