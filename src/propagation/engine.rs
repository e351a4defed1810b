use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use super::error::PropagationError;
use super::frames::{sidereal_angle, teme_to_ecef_position, teme_to_ecef_velocity};
use super::geodetic::ecef_to_geodetic;
use super::types::{EarthFixedState, GeodeticPosition};

/// Orbit propagation capability used by the trajectory and live computers.
///
/// Implementations bind an element pair once and can then be queried at any instant.
pub trait PropagationEngine: Send + Sync + 'static {
    type Propagator: Send;

    fn propagator(&self, line1: &str, line2: &str) -> Result<Self::Propagator, PropagationError>;

    fn state_at(
        &self,
        propagator: &Self::Propagator,
        at: DateTime<Utc>,
    ) -> Result<EarthFixedState, PropagationError>;

    /// Earth-fixed position to WGS84. The instant is unused for a frame that rotates with the Earth.
    fn geodetic(&self, position_km: [f64; 3], _at: DateTime<Utc>) -> GeodeticPosition {
        ecef_to_geodetic(position_km)
    }

    fn position_at(
        &self,
        propagator: &Self::Propagator,
        at: DateTime<Utc>,
    ) -> Result<GeodeticPosition, PropagationError> {
        let state = self.state_at(propagator, at)?;
        Ok(self.geodetic(state.position_km, at))
    }
}

pub struct Sgp4Propagator {
    elements: Elements,
    constants: Constants,
}

impl Sgp4Propagator {
    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }
}

/// SGP4/SDP4 via the `sgp4` crate, TEME rotated to Earth-fixed by sidereal angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Engine;

impl PropagationEngine for Sgp4Engine {
    type Propagator = Sgp4Propagator;

    fn propagator(&self, line1: &str, line2: &str) -> Result<Sgp4Propagator, PropagationError> {
        let elements = Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())?;
        let constants = Constants::from_elements(&elements)?;
        Ok(Sgp4Propagator {
            elements,
            constants,
        })
    }

    fn state_at(
        &self,
        propagator: &Sgp4Propagator,
        at: DateTime<Utc>,
    ) -> Result<EarthFixedState, PropagationError> {
        let minutes = propagator
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| PropagationError::Epoch(e.to_string()))?;

        let prediction = propagator
            .constants
            .propagate(minutes)
            .map_err(|e| PropagationError::Propagation(e.to_string()))?;

        let gmst = sidereal_angle(at);
        Ok(EarthFixedState {
            position_km: teme_to_ecef_position(prediction.position, gmst),
            velocity_km_s: teme_to_ecef_velocity(prediction.position, prediction.velocity, gmst),
        })
    }
}
