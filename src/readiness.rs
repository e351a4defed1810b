use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set once the first trajectory has been stored. Never reset.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: Arc<AtomicBool>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            log::info!("Trajectory data available, live positions enabled");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed_and_stays_open() {
        let gate = ReadinessGate::new();
        let observer = gate.clone();
        assert!(!observer.is_ready());

        gate.mark_ready();
        gate.mark_ready();
        assert!(observer.is_ready());
    }
}
