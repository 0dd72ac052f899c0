//! Session footprint: a corridor polygon around the track.
//!
//! The path is grown by `dilate`, shrunk back by the slightly smaller
//! `erode` and the outline simplified with `simplify`, all in degrees. The
//! result follows the shape of the path rather than its convex hull and
//! smooths out GPS jitter narrower than the difference of the two margins.

use chrono::{DateTime, Utc};
use geo::{Area, Buffer, Coord, LineString, Polygon, Simplify};

use crate::point::{Point, PointHull};

#[derive(Clone, Debug, PartialEq)]
pub struct HullParams {
    pub dilate: f64,
    pub erode: f64,
    pub simplify: f64,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            dilate: 0.005,
            erode: 0.0045,
            simplify: 0.0005,
        }
    }
}

/// Hull of a single session. Sessions with fewer than two distinct
/// positions have no hull.
pub fn extract_hull(points: &[Point], params: &HullParams) -> Vec<PointHull> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let session_id = first.session_id.unwrap_or(first.timestamp);

    let mut coords: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();
    coords.dedup();
    if coords.len() < 2 {
        return Vec::new();
    }

    let Some(polygon) = corridor(LineString::new(coords), params) else {
        return Vec::new();
    };
    ring_vertices(&polygon)
        .into_iter()
        .enumerate()
        .map(|(vertex_id, c)| PointHull {
            session_id,
            vertex_id,
            latitude: c.y,
            longitude: c.x,
        })
        .collect()
}

/// Hulls of a stream holding several sessions back to back.
pub fn extract_hulls(points: &[Point], params: &HullParams) -> Vec<PointHull> {
    points
        .chunk_by(|a, b| session_of(a) == session_of(b))
        .flat_map(|session| extract_hull(session, params))
        .collect()
}

fn session_of(p: &Point) -> DateTime<Utc> {
    p.session_id.unwrap_or(p.timestamp)
}

fn corridor(line: LineString<f64>, params: &HullParams) -> Option<Polygon<f64>> {
    let grown = line.buffer(params.dilate);
    let shrunk = grown.buffer(-params.erode);
    // Eroding a thin neck can split the corridor; keep the main body.
    let body = shrunk
        .into_iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))?;
    if body.unsigned_area() == 0.0 {
        return None;
    }

    let simplified = body.simplify(params.simplify);
    if simplified.exterior().0.len() < 4 || simplified.unsigned_area() == 0.0 {
        // Simplification must not collapse the ring.
        return Some(body);
    }
    Some(simplified)
}

/// Exterior ring without the closing coordinate.
fn ring_vertices(polygon: &Polygon<f64>) -> Vec<Coord<f64>> {
    let mut coords = polygon.exterior().0.clone();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}
