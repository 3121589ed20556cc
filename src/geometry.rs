//! Route geometry: bearings, segmentation, and the uniform-speed time model.
//!
//! Everything here is pure math on WGS84 lat/lon pairs — no provider calls.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Assumed average travel speed used to spread pass-times along the route.
pub const AVERAGE_SPEED_KMH: f64 = 60.0;

/// Routes with fewer points than this (and more than two) get densified
/// so per-segment charts stay smooth.
const RESAMPLE_LIMIT: usize = 20;
const RESAMPLE_DENSITY: usize = 10;

/// A geographic point. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// One leg of a route, taken between two consecutive polyline points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Coordinate,
    pub end: Coordinate,
}

/// Initial compass bearing travelling from `a` to `b`, degrees in [0, 360).
///
/// Forward azimuth on a sphere. Longitude differences wrap correctly across
/// the antimeridian because they only enter through sin/cos. A degenerate
/// pair (`a == b`) yields 0.0.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Split a polyline into consecutive-pair segments (count = points − 1).
pub fn segments_of(points: &[Coordinate]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|w| Segment { start: w[0], end: w[1] })
        .collect()
}

/// Densify short routes by linear interpolation: 10 sub-points per pair,
/// final point retained. Two-point fallbacks and already-dense routes pass
/// through unchanged.
pub fn resample(points: &[Coordinate]) -> Vec<Coordinate> {
    if points.len() <= 2 || points.len() >= RESAMPLE_LIMIT {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity((points.len() - 1) * RESAMPLE_DENSITY + 1);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for j in 0..RESAMPLE_DENSITY {
            let t = j as f64 / RESAMPLE_DENSITY as f64;
            out.push(Coordinate {
                lat: a.lat + (b.lat - a.lat) * t,
                lon: a.lon + (b.lon - a.lon) * t,
            });
        }
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

/// Assign segment `i` the pass-time `departure + (i / count) * total_duration`,
/// modeling uniform speed. Zero or unknown duration pins every segment to the
/// departure instant, so exposure is evaluated at a single moment.
pub fn allocate_timestamps(
    segment_count: usize,
    departure: DateTime<Utc>,
    total_duration_ms: f64,
) -> Vec<DateTime<Utc>> {
    if segment_count == 0 {
        return Vec::new();
    }
    if total_duration_ms <= 0.0 {
        return vec![departure; segment_count];
    }
    (0..segment_count)
        .map(|i| {
            let offset_ms = (i as f64 / segment_count as f64) * total_duration_ms;
            departure + Duration::milliseconds(offset_ms.round() as i64)
        })
        .collect()
}

/// Trip duration in milliseconds for a route of the given length, assuming
/// `AVERAGE_SPEED_KMH`. Unknown distance (≤ 0) yields 0.
pub fn travel_duration_ms(distance_meters: f64) -> f64 {
    if distance_meters <= 0.0 {
        return 0.0;
    }
    let meters_per_second = AVERAGE_SPEED_KMH / 3.6;
    distance_meters / meters_per_second * 1000.0
}
