//! Per-segment exposure analysis: which side of the vehicle does the sun
//! strike, and how hard?
//!
//! The side rule works on the angle between the sun's azimuth and the
//! direction of travel, normalized to [0, 360): up to 180° means the sun is
//! on the right-hand side, beyond it the left. Intensity folds the sun's
//! altitude together with cloud cover into a dimensionless [0, 1] score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::daylight::DaylightWindow;
use crate::geometry::{self, Segment};
use crate::providers::{ProviderError, SolarEphemeris};

/// Side of the vehicle the sun falls on, as seen facing the direction of
/// travel. `None` means the segment gets no direct sun at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunSide {
    Left,
    Right,
    None,
}

impl SunSide {
    /// The shaded side is whatever the sun is not on.
    pub fn opposite(self) -> SunSide {
        match self {
            SunSide::Left => SunSide::Right,
            SunSide::Right => SunSide::Left,
            SunSide::None => SunSide::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SunSide::Left => "left",
            SunSide::Right => "right",
            SunSide::None => "none",
        }
    }
}

impl fmt::Display for SunSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyzed route segment, in route order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub index: usize,
    /// Travel heading in degrees, 0° = north, clockwise.
    pub heading: f64,
    /// Sun azimuth at the segment's pass-time, same convention.
    pub sun_azimuth: f64,
    pub sun_side: SunSide,
    /// Exposure score in [0, 1]: sin(altitude), attenuated by cloud cover.
    pub intensity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Decide the sun side for a single heading/azimuth pair.
pub fn side_of(heading: f64, sun_azimuth: f64) -> SunSide {
    let relative = (sun_azimuth - heading).rem_euclid(360.0);
    if relative <= 180.0 {
        SunSide::Right
    } else {
        SunSide::Left
    }
}

/// Exposure score for a sunlit segment: zero at or below the horizon,
/// scaled down linearly by cloud cover (0–100%).
pub fn intensity_of(altitude_deg: f64, cloud_cover: f64) -> f64 {
    let clear = 1.0 - cloud_cover.clamp(0.0, 100.0) / 100.0;
    altitude_deg.to_radians().sin().max(0.0) * clear
}

/// Analyze every segment of a route at its allocated pass-time.
///
/// `trip_in_daylight` is the departure-keyed gate: when false the whole trip
/// is treated as dark and every segment reports `sun_side: none` with zero
/// intensity, though headings and azimuths are still computed so the chart
/// stays meaningful. When true, each segment is additionally checked against
/// the daylight window and the sun must actually be above the horizon there.
pub fn analyze_segments(
    ephemeris: &dyn SolarEphemeris,
    segments: &[Segment],
    times: &[DateTime<Utc>],
    window: &DaylightWindow,
    cloud_cover: f64,
    trip_in_daylight: bool,
) -> Result<Vec<SegmentResult>, ProviderError> {
    let mut results = Vec::with_capacity(segments.len());
    for (index, (seg, &at)) in segments.iter().zip(times.iter()).enumerate() {
        let heading = geometry::bearing(seg.start, seg.end);
        let sun = ephemeris.sun_position(at, seg.start)?;

        let sunlit = trip_in_daylight && window.contains(at) && sun.altitude > 0.0;
        let (sun_side, intensity) = if sunlit {
            (side_of(heading, sun.azimuth), intensity_of(sun.altitude, cloud_cover))
        } else {
            (SunSide::None, 0.0)
        };

        results.push(SegmentResult {
            index,
            heading,
            sun_azimuth: sun.azimuth,
            sun_side,
            intensity,
            timestamp: at,
        });
    }
    Ok(results)
}
