use crate::geodesy::deviation_from_chord;
use crate::point::Point;

/// Default simplification tolerance in meters.
pub const SIMPLIFY_TOLERANCE_M: f64 = 5.0;

/// Order a session by time, drop repeated fixes and simplify the path.
///
/// Of several points sharing a timestamp only the first survives, then of
/// consecutive points sharing a position and elevation only the first
/// survives. The remaining polyline is reduced with Ramer-Douglas-Peucker.
pub fn clean(mut points: Vec<Point>, tolerance_m: f64) -> Vec<Point> {
    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);
    points.dedup_by(|later, earlier| later.same_location(earlier));
    simplify_polyline(&points, tolerance_m)
}

/// Ramer-Douglas-Peucker over the 3-D path. Endpoints are always kept.
pub fn simplify_polyline(points: &[Point], tolerance_m: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut spans = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = spans.pop() {
        if last - first < 2 {
            continue;
        }
        let (start, end) = (&points[first], &points[last]);
        let mut worst = 0.0;
        let mut worst_idx = first + 1;
        for (idx, p) in points.iter().enumerate().take(last).skip(first + 1) {
            let d = deviation_from_chord(p, start, end);
            if d > worst {
                worst = d;
                worst_idx = idx;
            }
        }
        if worst < tolerance_m {
            continue;
        }
        keep[worst_idx] = true;
        spans.push((first, worst_idx));
        spans.push((worst_idx, last));
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}
