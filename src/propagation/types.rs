use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A point relative to the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Position (km) and velocity (km/s) in the Earth-fixed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthFixedState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}
