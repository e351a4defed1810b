use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::broadcast::BroadcastHub;
use crate::cache::{MemoryCache, PositionCache};
use crate::catalog::{ElementFeed, FetchError, HttpFeed, Ingestor, OrbitalElementRecord};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, StartupConfig};
use crate::live::{spawn_live_loop, LivePositionComputer};
use crate::metrics::PipelineMetrics;
use crate::periodic::{spawn_periodic, PeriodicTask};
use crate::propagation::{PropagationEngine, Sgp4Engine};
use crate::readiness::ReadinessGate;
use crate::store::{open_collection, SharedCollection, StoreError};
use crate::trajectory::{TrajectoryComputer, TrajectoryRecord};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage: {0}")]
    Store(#[from] StoreError),
    #[error("element feed: {0}")]
    Fetch(#[from] FetchError),
}

/// The ingest, trajectory and live stages wired to shared storage, cache, hub and gate.
pub struct Pipeline<E: PropagationEngine> {
    ingestor: Ingestor,
    trajectories: TrajectoryComputer<E>,
    live: Arc<LivePositionComputer<E>>,
    cache: Arc<dyn PositionCache>,
    hub: BroadcastHub,
    gate: ReadinessGate,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline<Sgp4Engine> {
    /// SGP4 pipeline fed from the configured HTTP feed.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let feed = HttpFeed::new(&config.feed)?;
        Self::with_feed(config, Box::new(feed))
    }

    pub fn with_feed(config: &Config, feed: Box<dyn ElementFeed>) -> Result<Self, PipelineError> {
        Ok(Self::new(
            config,
            Arc::new(Sgp4Engine),
            feed,
            open_collection(&config.storage)?,
            open_collection(&config.storage)?,
            Arc::new(SystemClock),
        ))
    }
}

impl<E: PropagationEngine> Pipeline<E> {
    pub fn new(
        config: &Config,
        engine: Arc<E>,
        feed: Box<dyn ElementFeed>,
        records: SharedCollection<OrbitalElementRecord>,
        trajectories: SharedCollection<TrajectoryRecord>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = ReadinessGate::new();
        let metrics = Arc::new(PipelineMetrics::default());
        let cache: Arc<dyn PositionCache> = Arc::new(MemoryCache::new());
        let hub = BroadcastHub::new(config.live.channel_capacity);

        let ingestor = Ingestor::new(
            feed,
            records.clone(),
            config.feed.validation_mode(),
            metrics.clone(),
        );
        let trajectories = TrajectoryComputer::new(
            engine.clone(),
            records.clone(),
            trajectories,
            clock.clone(),
            gate.clone(),
            metrics.clone(),
            config.trajectory.workers,
        );
        let live = Arc::new(LivePositionComputer::new(
            engine,
            records,
            cache.clone(),
            hub.clone(),
            clock,
            gate.clone(),
            metrics.clone(),
            config.live.cache_ttl,
        ));

        Pipeline {
            ingestor,
            trajectories,
            live,
            cache,
            hub,
            gate,
            metrics,
        }
    }

    /// Initial ingest followed by a trajectory run. Failures are logged and startup goes on:
    /// the live loop simply stays gated until a later trajectory run succeeds.
    pub async fn startup(&self, startup: &StartupConfig) {
        if startup.ingest {
            self.ingest_logged("Startup").await;
        }
        if startup.trajectories {
            self.compute_logged("Startup").await;
        }
    }

    /// Re-ingests the feed, then recomputes every trajectory. A failed ingest still recomputes
    /// from the records already stored.
    pub async fn refresh(&self) {
        self.ingest_logged("Refresh").await;
        self.compute_logged("Refresh").await;
    }

    async fn ingest_logged(&self, stage: &str) {
        if let Err(e) = self.ingestor.ingest().await {
            log::warn!("{} ingest failed: {}", stage, e);
        }
    }

    async fn compute_logged(&self, stage: &str) {
        if let Err(e) = self.trajectories.compute_and_store_all().await {
            log::warn!("{} trajectory run failed: {}", stage, e);
        }
    }

    pub fn spawn_live_loop(&self, period: Duration) -> PeriodicTask {
        spawn_live_loop(self.live.clone(), period)
    }

    /// Runs [`Pipeline::refresh`] every `period`, the first one a full period from now.
    pub fn spawn_refresh_loop(self: &Arc<Self>, period: Duration) -> PeriodicTask {
        let pipeline = self.clone();
        spawn_periodic("feed refresh", Instant::now() + period, period, move || {
            let pipeline = pipeline.clone();
            async move {
                pipeline.refresh().await;
            }
        })
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    pub fn trajectories(&self) -> &TrajectoryComputer<E> {
        &self.trajectories
    }

    pub fn live(&self) -> &LivePositionComputer<E> {
        &self.live
    }

    pub fn cache(&self) -> &dyn PositionCache {
        self.cache.as_ref()
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }
}
