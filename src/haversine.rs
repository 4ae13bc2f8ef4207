//! Great-circle distance between two points.
//!
//! Used by the geofence proximity fallback; accurate to textbook values
//! on the mean-radius sphere.

use crate::polyline::Point;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate haversine distance between two points in kilometers.
pub fn haversine_km(from: Point, to: Point) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let point = Point::new(45.137, 6.683);
        let dist = haversine_km(point, point);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_paris_london() {
        // Paris (48.8566, 2.3522) to London (51.5074, -0.1278), ~344 km
        let dist = haversine_km(Point::new(48.8566, 2.3522), Point::new(51.5074, -0.1278));
        assert!((dist - 343.6).abs() < 1.0, "Paris to London should be ~344km, got {}", dist);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let dist = haversine_km(Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert!((dist - 111.19).abs() < 0.01, "got {}", dist);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Point::new(45.858, 6.911);
        let b = Point::new(46.2044, 6.1432);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-10);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_point() -> impl Strategy<Value = Point> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lng)| Point::new(lat, lng))
        }

        proptest! {
            #[test]
            fn prop_haversine_non_negative(a in valid_point(), b in valid_point()) {
                prop_assert!(haversine_km(a, b) >= 0.0);
            }

            #[test]
            fn prop_haversine_bounded_by_half_circumference(a in valid_point(), b in valid_point()) {
                let max_distance = std::f64::consts::PI * EARTH_RADIUS_KM;
                prop_assert!(haversine_km(a, b) <= max_distance + 0.1);
            }
        }
    }
}
