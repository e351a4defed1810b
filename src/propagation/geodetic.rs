use super::types::GeodeticPosition;

pub const WGS84_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// Converts an Earth-fixed cartesian position (km) to WGS84 geodetic coordinates.
pub fn ecef_to_geodetic(position_km: [f64; 3]) -> GeodeticPosition {
    let [x, y, z] = position_km;
    let a = WGS84_EQUATORIAL_RADIUS_KM;
    let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

    let longitude = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    let mut latitude = z.atan2(p * (1.0 - e2));
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + e2 * n * sin_lat).atan2(p);
        let converged = (next - latitude).abs() < LATITUDE_TOLERANCE_RAD;
        latitude = next;
        if converged {
            break;
        }
    }

    // Valid at the poles as well as the equator.
    let sin_lat = latitude.sin();
    let cos_lat = latitude.cos();
    let altitude = p * cos_lat + z * sin_lat - a * (1.0 - e2 * sin_lat * sin_lat).sqrt();

    GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km: altitude,
    }
}
