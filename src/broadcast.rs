use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::live::LivePositionSnapshot;

pub const POSITIONS_TOPIC: &str = "/topic/positions";

/// One complete live cycle, as delivered to subscribers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PositionBroadcast {
    pub topic: String,
    pub cycle: u64,
    pub computed_at: DateTime<Utc>,
    pub positions: Vec<LivePositionSnapshot>,
}

/// Best-effort fan-out to whoever is subscribed at publish time.
#[derive(Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<Arc<PositionBroadcast>>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        BroadcastHub { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PositionBroadcast>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns the number of subscribers the message was handed to.
    pub fn publish(&self, message: PositionBroadcast) -> usize {
        self.sender.send(Arc::new(message)).unwrap_or(0)
    }
}
