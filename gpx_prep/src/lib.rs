//! Turns GPX recording sessions into an enriched point table and a
//! per-session footprint polygon.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use thiserror::Error;

pub mod clean;
pub mod cumulate;
pub mod enrich;
pub mod geodesy;
pub mod hull;
pub mod point;

pub use clean::{clean, SIMPLIFY_TOLERANCE_M};
pub use cumulate::cumulate;
pub use enrich::enrich;
pub use hull::{extract_hull, extract_hulls, HullParams};
pub use point::{Point, PointHull};

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("failed to parse GPX file: {0}")]
    GpxParse(String),
    #[error("track point {index} has no {field}")]
    MissingField { field: &'static str, index: usize },
    #[error("found {extensions} track point extensions for {points} track points")]
    PointCountMismatch { points: usize, extensions: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    pub simplify_tolerance_m: f64,
    pub hull: HullParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            simplify_tolerance_m: SIMPLIFY_TOLERANCE_M,
            hull: HullParams::default(),
        }
    }
}

/// Parse the track points of a GPX document, all tracks and segments
/// flattened in document order. Every point needs a time and an elevation.
pub fn parse_track(input: &[u8]) -> Result<Vec<Point>, PrepError> {
    let mut cursor = Cursor::new(input);
    let gpx = gpx::read(&mut cursor).map_err(|e| PrepError::GpxParse(e.to_string()))?;
    let heart_rates = parse_heart_rates(input)?;

    let waypoints: Vec<gpx::Waypoint> = gpx
        .tracks
        .into_iter()
        .flat_map(|track| track.segments)
        .flat_map(|segment| segment.points)
        .collect();
    if waypoints.len() != heart_rates.len() {
        return Err(PrepError::PointCountMismatch {
            points: waypoints.len(),
            extensions: heart_rates.len(),
        });
    }

    let mut out = Vec::with_capacity(waypoints.len());
    for (index, (point, heart_rate)) in waypoints.into_iter().zip(heart_rates).enumerate() {
        let time = point
            .time
            .ok_or(PrepError::MissingField { field: "time", index })?;
        let iso = time
            .format()
            .map_err(|e| PrepError::GpxParse(e.to_string()))?;
        let timestamp = DateTime::parse_from_rfc3339(&iso)
            .map_err(|e| PrepError::GpxParse(e.to_string()))?
            .with_timezone(&Utc);
        let elevation = point.elevation.ok_or(PrepError::MissingField {
            field: "elevation",
            index,
        })?;
        let geo = point.point();
        out.push(Point::new(timestamp, geo.y(), geo.x(), elevation, heart_rate));
    }
    Ok(out)
}

// The gpx reader skips <extensions>, so heart rates come from a second,
// structural pass over trk/trkseg/trkpt. The children of <gpx> are read in
// document order so tracks need not be contiguous.
#[derive(Deserialize)]
struct GpxExtensions {
    #[serde(rename = "$value", default)]
    children: Vec<GpxChild>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum GpxChild {
    Trk(TrackExtensions),
    Metadata(IgnoredAny),
    Wpt(IgnoredAny),
    Rte(IgnoredAny),
    Extensions(IgnoredAny),
}

#[derive(Deserialize)]
struct TrackExtensions {
    #[serde(rename = "trkseg", default)]
    segments: Vec<SegmentExtensions>,
}

#[derive(Deserialize)]
struct SegmentExtensions {
    #[serde(rename = "trkpt", default)]
    points: Vec<TrackPointExtensions>,
}

#[derive(Deserialize)]
struct TrackPointExtensions {
    #[serde(default)]
    extensions: Option<Extensions>,
}

#[derive(Deserialize)]
struct Extensions {
    #[serde(rename = "TrackPointExtension", default)]
    track_point: Option<HeartRateExtension>,
}

#[derive(Deserialize)]
struct HeartRateExtension {
    #[serde(default)]
    hr: Option<u16>,
}

fn parse_heart_rates(input: &[u8]) -> Result<Vec<Option<u16>>, PrepError> {
    let doc: GpxExtensions =
        serde_xml_rs::from_reader(input).map_err(|e| PrepError::GpxParse(e.to_string()))?;
    Ok(doc
        .children
        .into_iter()
        .filter_map(|child| match child {
            GpxChild::Trk(track) => Some(track),
            _ => None,
        })
        .flat_map(|track| track.segments)
        .flat_map(|segment| segment.points)
        .map(|point| point.extensions.and_then(|ext| ext.track_point?.hr))
        .collect())
}

/// Clean, enrich and cumulate one session.
pub fn prepare_session(points: Vec<Point>, params: &Params) -> Vec<Point> {
    let cleaned = clean(points, params.simplify_tolerance_m);
    cumulate(enrich(cleaned)).collect()
}

/// Footprint of one prepared session.
pub fn session_hull(points: &[Point], params: &Params) -> Vec<PointHull> {
    extract_hull(points, &params.hull)
}
