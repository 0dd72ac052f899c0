use chrono::{DateTime, Utc};

use crate::geodesy::{bearing, distance_3d, elevation_angle};
use crate::point::{Point, NO_SPEED};

/// Lazily attach step metrics to a time-ordered session.
pub fn enrich<I>(points: I) -> Enrich<I::IntoIter>
where
    I: IntoIterator<Item = Point>,
{
    Enrich {
        inner: points.into_iter(),
        prev: None,
        session_id: None,
    }
}

/// Iterator returned by [`enrich`].
///
/// The first point only receives the session identifier (its own
/// timestamp); every following point is measured against its predecessor.
pub struct Enrich<I> {
    inner: I,
    prev: Option<Point>,
    session_id: Option<DateTime<Utc>>,
}

impl<I> Iterator for Enrich<I>
where
    I: Iterator<Item = Point>,
{
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let point = self.inner.next()?;
        let enriched = match (self.prev, self.session_id) {
            (Some(prev), Some(session_id)) => step(&prev, &point, session_id),
            _ => {
                self.session_id = Some(point.timestamp);
                Point {
                    session_id: self.session_id,
                    ..point
                }
            }
        };
        self.prev = Some(point);
        Some(enriched)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn step(prev: &Point, next: &Point, session_id: DateTime<Utc>) -> Point {
    let distance = distance_3d(prev, next);
    let duration = seconds_between(prev.timestamp, next.timestamp);
    Point {
        session_id: Some(session_id),
        distance,
        duration,
        bearing: bearing(prev, next),
        elevation_angle: elevation_angle(prev, next),
        elevation_diff: next.elevation - prev.elevation,
        instantaneous_speed: speed(distance, duration),
        ..*next
    }
}

pub(crate) fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Distance over duration; a non-positive duration has no speed.
pub(crate) fn speed(distance: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        distance / duration
    } else {
        NO_SPEED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::ONE_DEGREE_M;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 9, 21, 14, 0, 0).unwrap()
    }

    fn pt(sec: i64, lat: f64, lon: f64, ele: f64) -> Point {
        Point::new(t0() + Duration::seconds(sec), lat, lon, ele, None)
    }

    fn spherical_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
        let dl = (lon2 - lon1).to_radians();
        (p2.cos() * dl.sin())
            .atan2(p1.cos() * p2.sin() - p1.sin() * p2.cos() * dl.cos())
            .to_degrees()
    }

    #[test]
    fn test_two_points_hundred_meters_fifty_seconds() {
        let dlat = 60.0 / ONE_DEGREE_M;
        let dlon = 80.0 / ONE_DEGREE_M / 45.0_f64.to_radians().cos();
        let a = pt(0, 45.0, 7.0, 300.0);
        let b = pt(50, 45.0 + dlat, 7.0 + dlon, 300.0);
        let out: Vec<Point> = enrich(vec![a, b]).collect();
        assert_eq!(out.len(), 2);

        let second = out[1];
        assert!((second.distance - 100.0).abs() < 1e-6);
        assert_eq!(second.duration, 50.0);
        assert!((second.instantaneous_speed - 2.0).abs() < 1e-6);
        assert_eq!(second.elevation_diff, 0.0);
        assert_eq!(second.elevation_angle, 0.0);
        let expected = spherical_bearing(45.0, 7.0, 45.0 + dlat, 7.0 + dlon);
        assert!((second.bearing - expected).abs() < 1e-6);
        assert!(second.bearing > 0.0 && second.bearing < 90.0);
    }

    #[test]
    fn test_first_point_only_gets_session_id() {
        let a = pt(0, 45.0, 7.0, 300.0);
        let b = pt(10, 45.001, 7.0, 310.0);
        let out: Vec<Point> = enrich(vec![a, b]).collect();
        assert_eq!(out[0], Point { session_id: Some(a.timestamp), ..a });
        assert_eq!(out[1].session_id, Some(a.timestamp));
    }

    #[test]
    fn test_each_step_measured_from_raw_predecessor() {
        let points = vec![
            pt(0, 45.0, 7.0, 300.0),
            pt(10, 45.001, 7.0, 305.0),
            pt(30, 45.002, 7.0, 301.0),
        ];
        let out: Vec<Point> = enrich(points.clone()).collect();
        assert_eq!(out[1].elevation_diff, 5.0);
        assert_eq!(out[2].elevation_diff, -4.0);
        assert_eq!(out[2].duration, 20.0);
        assert!(out[2].elevation_angle < 0.0);
        assert!(out.iter().all(|p| p.session_id == Some(points[0].timestamp)));
    }

    #[test]
    fn test_single_and_empty_sessions() {
        assert_eq!(enrich(Vec::new()).count(), 0);
        let a = pt(0, 45.0, 7.0, 300.0);
        let out: Vec<Point> = enrich(vec![a]).collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].instantaneous_speed, 0.0);
        assert_eq!(out[0].session_id, Some(a.timestamp));
    }

    #[test]
    fn test_zero_duration_has_no_speed() {
        assert_eq!(speed(12.0, 0.0), 0.0);
        assert_eq!(speed(12.0, 4.0), 3.0);
    }
}
