//! Great-circle distance between coordinates.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two `(lat, lon)` points given
/// in decimal degrees.
///
/// Accurate to within the usual spherical-model error (about 0.5%), which
/// is ample for the 150 m duplicate threshold used by reconciliation.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards against a > 1.0 from rounding near antipodes.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert!(haversine_km(25.2, 55.3, 25.2, 55.3).abs() < 1e-12);
    }

    #[test]
    fn symmetric() {
        let a = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        let b = haversine_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn london_to_paris() {
        // Reference great-circle distance is roughly 343.5 km.
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn short_distance_near_dedup_threshold() {
        // 0.001 degrees of latitude is about 111 m.
        let d = haversine_km(25.2, 55.3, 25.201, 55.3);
        assert!(d > 0.10 && d < 0.12, "got {d}");
    }

    #[test]
    fn antipodes_do_not_produce_nan() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
