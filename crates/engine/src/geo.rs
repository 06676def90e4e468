//! Distances between map points.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance in kilometres ("as the crow flies").
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Sum of the legs through `points`, in order.
pub fn route_km(points: &[LatLng]) -> f64 {
    points.windows(2).map(|leg| haversine_km(leg[0], leg[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_longitude_on_the_equator() {
        let d = haversine_km(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn same_point_is_zero() {
        let p = LatLng::new(-6.7924, 39.2083);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let dar = LatLng::new(-6.7924, 39.2083);
        let arusha = LatLng::new(-3.3869, 36.6830);
        let there = haversine_km(dar, arusha);
        assert!((there - haversine_km(arusha, dar)).abs() < 1e-9);
        assert!(there > 450.0 && there < 500.0, "got {there}");
    }

    #[test]
    fn route_adds_legs() {
        let points = [
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(0.0, 2.0),
        ];
        assert!((route_km(&points) - 2.0 * 111.19).abs() < 0.05);
        assert_eq!(route_km(&points[..1]), 0.0);
    }
}
