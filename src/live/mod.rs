mod computer;
mod scheduler;
mod types;

pub use computer::{cache_key, compute_snapshots, LivePositionComputer};
pub use scheduler::spawn_live_loop;
pub use types::{CachedPosition, CycleOutcome, CycleSummary, LiveBatch, LivePositionSnapshot};
