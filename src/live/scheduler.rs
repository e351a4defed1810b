use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::computer::LivePositionComputer;
use crate::periodic::{spawn_periodic, PeriodicTask};
use crate::propagation::PropagationEngine;

/// Runs a live cycle every `period`, the first one immediately.
pub fn spawn_live_loop<E: PropagationEngine>(
    computer: Arc<LivePositionComputer<E>>,
    period: Duration,
) -> PeriodicTask {
    spawn_periodic("live positions", Instant::now(), period, move || {
        let computer = computer.clone();
        async move {
            computer.run_cycle().await;
        }
    })
}
