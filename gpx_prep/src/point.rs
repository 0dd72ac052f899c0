use chrono::{DateTime, Utc};
use serde::Serialize;

pub const NO_DISTANCE: f64 = 0.0;
pub const NO_DURATION: f64 = 0.0;
pub const NO_BEARING: f64 = 0.0;
pub const NO_ELEVATION_ANGLE: f64 = 0.0;
pub const NO_ELEVATION_DIFF: f64 = 0.0;
pub const NO_SPEED: f64 = 0.0;
pub const ZERO_TOTAL: f64 = 0.0;

/// One sample of a recording session.
///
/// Ingestion fills the raw fields only; every later stage returns a new value
/// built with struct update syntax, so a yielded point is never changed.
/// Serialization order is the column order of the point table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub heart_rate: Option<u16>,
    pub session_id: Option<DateTime<Utc>>,
    pub distance: f64,
    pub duration: f64,
    pub bearing: f64,
    pub elevation_angle: f64,
    pub elevation_diff: f64,
    pub instantaneous_speed: f64,
    #[serde(rename = "cumulative_downhill")]
    pub cumulative_descent: f64,
    #[serde(rename = "cumulative_uphill")]
    pub cumulative_ascent: f64,
    pub cumulative_distance: f64,
    pub cumulative_duration: f64,
    pub rolling_average_speed: f64,
}

impl Point {
    /// Column names of the point table, in serialization order.
    pub const FIELDS: [&'static str; 17] = [
        "time",
        "latitude",
        "longitude",
        "elevation",
        "heart_rate",
        "session_id",
        "distance",
        "duration",
        "bearing",
        "elevation_angle",
        "elevation_diff",
        "instantaneous_speed",
        "cumulative_downhill",
        "cumulative_uphill",
        "cumulative_distance",
        "cumulative_duration",
        "rolling_average_speed",
    ];

    pub fn new(
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        elevation: f64,
        heart_rate: Option<u16>,
    ) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            elevation,
            heart_rate,
            session_id: None,
            distance: NO_DISTANCE,
            duration: NO_DURATION,
            bearing: NO_BEARING,
            elevation_angle: NO_ELEVATION_ANGLE,
            elevation_diff: NO_ELEVATION_DIFF,
            instantaneous_speed: NO_SPEED,
            cumulative_descent: ZERO_TOTAL,
            cumulative_ascent: ZERO_TOTAL,
            cumulative_distance: ZERO_TOTAL,
            cumulative_duration: ZERO_TOTAL,
            rolling_average_speed: NO_SPEED,
        }
    }

    /// Same horizontal position and elevation.
    pub fn same_location(&self, other: &Point) -> bool {
        self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.elevation == other.elevation
    }
}

/// One vertex of a session hull. `vertex_id` gives the ring order; the ring
/// closes from the last vertex back to vertex 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointHull {
    pub session_id: DateTime<Utc>,
    pub vertex_id: usize,
    pub latitude: f64,
    pub longitude: f64,
}

impl PointHull {
    pub const FIELDS: [&'static str; 4] = ["session_id", "vertex_id", "latitude", "longitude"];
}
