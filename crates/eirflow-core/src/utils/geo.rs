/// Mean Earth radius used by the distance calculations, in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default map centre (Dublin city centre).
pub const CITY_CENTER: (f64, f64) = (53.3498, -6.2603);

/// Great-circle distance between two `(lat, lng)` points in meters.
pub fn haversine_meters(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lng2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// "850 m" below a kilometre, "2.4 km" above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        assert_eq!(haversine_meters(CITY_CENTER, CITY_CENTER), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is ~111.2 km everywhere
        let d = haversine_meters((53.0, -6.0), (54.0, -6.0));
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(850.4), "850 m");
        assert_eq!(format_distance(2400.0), "2.4 km");
    }
}
