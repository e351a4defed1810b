mod engine;
mod error;
mod frames;
mod geodetic;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use engine::{PropagationEngine, Sgp4Engine, Sgp4Propagator};
pub use error::PropagationError;
pub use frames::{teme_to_ecef_position, teme_to_ecef_velocity, EARTH_ROTATION_RAD_S};
pub use geodetic::{ecef_to_geodetic, WGS84_EQUATORIAL_RADIUS_KM, WGS84_FLATTENING};
pub use types::{EarthFixedState, GeodeticPosition};
