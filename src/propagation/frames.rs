use chrono::{DateTime, Utc};

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// Greenwich sidereal angle used to rotate TEME into the Earth-fixed frame.
pub fn sidereal_angle(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn teme_to_ecef_velocity(pos_teme: [f64; 3], vel_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = teme_to_ecef_position(vel_teme, gmst);
    [
        rotated[0] + EARTH_ROTATION_RAD_S * pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * pos[0],
        rotated[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotation_preserves_radius_and_z() {
        let teme = [4000.0, 3000.0, 5000.0];
        let ecef = teme_to_ecef_position(teme, 1.234);
        let r_teme = (teme[0] * teme[0] + teme[1] * teme[1]).sqrt();
        let r_ecef = (ecef[0] * ecef[0] + ecef[1] * ecef[1]).sqrt();
        assert!((r_teme - r_ecef).abs() < 1e-9);
        assert_eq!(ecef[2], teme[2]);
    }

    #[test]
    fn quarter_turn_maps_y_onto_x() {
        let ecef = teme_to_ecef_position([0.0, 7000.0, 0.0], FRAC_PI_2);
        assert!((ecef[0] - 7000.0).abs() < 1e-9);
        assert!(ecef[1].abs() < 1e-9);
    }

    #[test]
    fn velocity_removes_earth_rotation() {
        // A point co-rotating with the Earth has zero Earth-fixed velocity.
        let pos = [7000.0, 0.0, 0.0];
        let vel = [0.0, EARTH_ROTATION_RAD_S * 7000.0, 0.0];
        let ecef_vel = teme_to_ecef_velocity(pos, vel, 0.0);
        for component in ecef_vel {
            assert!(component.abs() < 1e-12);
        }
    }
}
