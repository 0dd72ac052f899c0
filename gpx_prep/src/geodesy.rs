//! Distance and direction between two points on the track.
//!
//! Short hops use an equirectangular approximation; anything spanning more
//! than `HAVERSINE_THRESHOLD_DEG` in latitude or longitude falls back to the
//! haversine formula.

use crate::point::Point;

pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Length of one degree of latitude, in meters.
pub const ONE_DEGREE_M: f64 = 1000.0 * 10_000.8 / 90.0;
const HAVERSINE_THRESHOLD_DEG: f64 = 0.2;

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Horizontal distance in meters, elevation ignored.
pub fn distance_2d(a: &Point, b: &Point) -> f64 {
    let dlat = a.latitude - b.latitude;
    let dlon = a.longitude - b.longitude;
    if dlat.abs() > HAVERSINE_THRESHOLD_DEG || dlon.abs() > HAVERSINE_THRESHOLD_DEG {
        return haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude);
    }
    let coef = a.latitude.to_radians().cos();
    let y = dlon * coef;
    (dlat * dlat + y * y).sqrt() * ONE_DEGREE_M
}

/// Straight-line distance in meters including the elevation change.
pub fn distance_3d(a: &Point, b: &Point) -> f64 {
    let flat = distance_2d(a, b);
    if a.elevation == b.elevation {
        return flat;
    }
    let rise = b.elevation - a.elevation;
    (flat * flat + rise * rise).sqrt()
}

/// Initial compass bearing from `a` to `b` in degrees, clockwise from north,
/// in (-180, 180]. Coincident positions give 0.
pub fn bearing(a: &Point, b: &Point) -> f64 {
    if a.latitude == b.latitude && a.longitude == b.longitude {
        return 0.0;
    }
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let x = lat2.cos() * dlon.sin();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let degrees = x.atan2(y).to_degrees();
    if degrees <= -180.0 {
        180.0
    } else {
        degrees
    }
}

/// Angle of climb (positive) or descent (negative) in degrees.
pub fn elevation_angle(a: &Point, b: &Point) -> f64 {
    let run = distance_2d(a, b);
    if run == 0.0 {
        return 0.0;
    }
    ((b.elevation - a.elevation) / run).atan().to_degrees()
}

/// Perpendicular 3-D distance of `p` from the chord `start`-`end`, from the
/// side lengths of the triangle they form.
pub fn deviation_from_chord(p: &Point, start: &Point, end: &Point) -> f64 {
    let base = distance_3d(start, end);
    if base == 0.0 {
        return distance_3d(start, p);
    }
    let b = distance_3d(start, p);
    let c = distance_3d(end, p);
    let s = (base + b + c) / 2.0;
    let area = (s * (s - base) * (s - b) * (s - c)).abs().sqrt();
    2.0 * area / base
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(lat: f64, lon: f64, ele: f64) -> Point {
        let t = Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap();
        Point::new(t, lat, lon, ele, None)
    }

    #[test]
    fn test_haversine_distance() {
        let dist = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((dist - 111_319.5).abs() < 1.0);
    }

    #[test]
    fn test_short_distance_matches_haversine() {
        let a = at(47.0, 8.0, 400.0);
        let b = at(47.001, 8.001, 400.0);
        let approx = distance_2d(&a, &b);
        let exact = haversine_distance(47.0, 8.0, 47.001, 8.001);
        assert!((approx - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_long_distance_uses_haversine() {
        let a = at(0.0, 0.0, 0.0);
        let b = at(0.0, 1.0, 0.0);
        assert_eq!(distance_2d(&a, &b), haversine_distance(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_distance_3d_adds_rise() {
        let a = at(47.0, 8.0, 400.0);
        let b = at(47.0, 8.0, 430.0);
        assert!((distance_3d(&a, &b) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = at(10.0, 10.0, 0.0);
        assert!(bearing(&origin, &at(10.01, 10.0, 0.0)).abs() < 1e-9);
        assert!((bearing(&origin, &at(10.0, 10.01, 0.0)) - 90.0).abs() < 0.01);
        assert!((bearing(&origin, &at(9.99, 10.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(&origin, &at(10.0, 9.99, 0.0)) + 90.0).abs() < 0.01);
    }

    #[test]
    fn test_bearing_of_coincident_points_is_zero() {
        let a = at(10.0, 10.0, 0.0);
        let b = at(10.0, 10.0, 25.0);
        assert_eq!(bearing(&a, &b), 0.0);
        assert_eq!(elevation_angle(&a, &b), 0.0);
    }

    #[test]
    fn test_elevation_angle_sign() {
        let a = at(47.0, 8.0, 400.0);
        let b = at(47.0009, 8.0, 500.0);
        let up = elevation_angle(&a, &b);
        let down = elevation_angle(&b, &a);
        assert!(up > 0.0 && up < 90.0);
        assert!(down < 0.0);
    }

    #[test]
    fn test_deviation_from_chord() {
        let start = at(0.0, 0.0, 0.0);
        let end = at(0.0, 0.002, 0.0);
        let on_line = at(0.0, 0.001, 0.0);
        let off_line = at(0.0001, 0.001, 0.0);
        assert!(deviation_from_chord(&on_line, &start, &end) < 1e-3);
        let expected = 0.0001 * ONE_DEGREE_M;
        assert!((deviation_from_chord(&off_line, &start, &end) - expected).abs() < 0.05);
    }
}
