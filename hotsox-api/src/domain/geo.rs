const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometres, rounded to 2 decimals.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(52.52, 13.405, 52.52, 13.405), 0.0);
    }

    #[test]
    fn berlin_to_munich() {
        let d = haversine_km(52.5200, 13.4050, 48.1351, 11.5820);
        assert!((d - 504.2).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_rounded() {
        let a = haversine_km(0.0, 0.0, 0.0, 1.0);
        let b = haversine_km(0.0, 1.0, 0.0, 0.0);
        assert_eq!(a, b);
        assert_eq!(a, 111.19);
    }
}
