use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to a task spawned by [`spawn_periodic`].
#[derive(Debug)]
pub struct PeriodicTask {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl PeriodicTask {
    /// Signals the task and waits for a running tick to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.await;
    }
}

/// Calls `tick` every `period`, starting at `first`. Ticks run inline, so a slow tick delays
/// the next one instead of overlapping it; ticks missed meanwhile are dropped.
pub fn spawn_periodic<F, Fut>(
    label: &'static str,
    first: Instant,
    period: Duration,
    mut tick: F,
) -> PeriodicTask
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, mut stop_rx) = oneshot::channel();

    let join = tokio::spawn(async move {
        let mut ticker = interval_at(first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Running {} every {}", label, humantime::format_duration(period));

        loop {
            let should_stop = tokio::select! {
                _ = ticker.tick() => false,
                _ = &mut stop_rx => true,
            };
            if should_stop {
                break;
            }
            tick().await;
        }

        log::info!("Stopped {}", label);
    });

    PeriodicTask { stop_tx, join }
}
