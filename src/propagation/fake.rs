use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{EarthFixedState, PropagationEngine, PropagationError, WGS84_EQUATORIAL_RADIUS_KM};

/// Deterministic engine for tests. Element pairs whose first line contains `BAD`
/// fail to bind, `PANIC` panics while binding; every requested instant is recorded.
#[derive(Default)]
pub(crate) struct FakeEngine {
    pub requests: Mutex<Vec<(String, DateTime<Utc>)>>,
}

pub(crate) struct FakePropagator {
    line1: String,
}

impl PropagationEngine for FakeEngine {
    type Propagator = FakePropagator;

    fn propagator(&self, line1: &str, _line2: &str) -> Result<FakePropagator, PropagationError> {
        if line1.contains("PANIC") {
            panic!("fake propagator panic");
        }
        if line1.contains("BAD") {
            return Err(PropagationError::Propagation("malformed element set".into()));
        }
        Ok(FakePropagator {
            line1: line1.to_string(),
        })
    }

    fn state_at(
        &self,
        propagator: &FakePropagator,
        at: DateTime<Utc>,
    ) -> Result<EarthFixedState, PropagationError> {
        self.requests
            .lock()
            .unwrap()
            .push((propagator.line1.clone(), at));
        Ok(EarthFixedState {
            position_km: [WGS84_EQUATORIAL_RADIUS_KM + 500.0, 0.0, 0.0],
            velocity_km_s: [0.0, 7.5, 0.0],
        })
    }
}
