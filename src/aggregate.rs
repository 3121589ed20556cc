//! Trip-level aggregation: majority vote over sunlit segments, confidence,
//! the narrative line, and the response body sent back over the wire.
//!
//! Only segments that actually receive sun take part in the vote; a trip
//! with none of them collapses into the "no sunlight" outcome. Ties go to
//! the right-hand side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::{SegmentResult, SunSide};
use crate::daylight::DaylightWindow;
use crate::geometry::Coordinate;
use crate::providers::WeatherReport;

pub const NO_SUNLIGHT_MESSAGE: &str = "No sunlight at the specified time";

const PAST_TRIP_NOTE: &str =
    "Departure time is in the past; sun positions reflect that historical moment.";

/// Weather block echoed back to the client when conditions are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub cloud_cover: f64,
    pub description: String,
}

/// Everything the aggregator needs besides the per-segment chart.
#[derive(Debug, Clone)]
pub struct TripContext {
    pub coordinates: Vec<Coordinate>,
    pub window: DaylightWindow,
    pub weather: Option<WeatherReport>,
    pub departure: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub total_duration_ms: f64,
}

/// The full answer for one trip.
///
/// `sun_side` and `shade_side` are serialized as explicit nulls on the night
/// path so clients can always read the keys; `confidence` is only present
/// when there were sunlit segments to vote over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripOutcome {
    pub sun_side: Option<SunSide>,
    pub shade_side: Option<SunSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub coordinates: Vec<Coordinate>,
    pub chart_data: Vec<SegmentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSummary>,
    pub daylight: DaylightWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    pub is_past_trip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_note: Option<String>,
}

/// Fold segment results into the trip verdict.
pub fn aggregate(chart: Vec<SegmentResult>, ctx: TripContext) -> TripOutcome {
    let TripContext { coordinates, window, weather, departure, now, total_duration_ms } = ctx;

    let sunlit: Vec<&SegmentResult> =
        chart.iter().filter(|s| s.sun_side != SunSide::None).collect();

    let avg_heading = circular_mean(chart.iter().map(|s| s.heading));
    let avg_azimuth = circular_mean(sunlit.iter().map(|s| s.sun_azimuth));

    let (sun_side, confidence, reason, message) = if sunlit.is_empty() {
        (None, None, None, Some(NO_SUNLIGHT_MESSAGE.to_string()))
    } else {
        let left = sunlit.iter().filter(|s| s.sun_side == SunSide::Left).count();
        let side = if left * 2 > sunlit.len() { SunSide::Left } else { SunSide::Right };
        let confidence = ((left as f64 / sunlit.len() as f64 - 0.5).abs() * 2.0).clamp(0.0, 1.0);

        let majority = match side {
            SunSide::Left => left,
            _ => sunlit.len() - left,
        };
        let reason = match (avg_heading, avg_azimuth) {
            (Some(h), Some(a)) => Some(format!(
                "Average route heading {:.1}° and average sun azimuth {:.1}°. \
                 The sun spends {} of {} sunlit segments on your {} side.",
                h,
                a,
                majority,
                sunlit.len(),
                side
            )),
            _ => None,
        };
        (Some(side), Some(confidence), reason, None)
    };

    let is_past_trip = departure < now;
    let trip_note = is_past_trip.then(|| PAST_TRIP_NOTE.to_string());

    TripOutcome {
        sun_side,
        shade_side: sun_side.map(SunSide::opposite),
        confidence,
        reason,
        message,
        coordinates,
        chart_data: chart,
        weather: weather.and_then(|w| {
            (!w.description.is_empty())
                .then(|| WeatherSummary { cloud_cover: w.cloud_cover, description: w.description })
        }),
        daylight: window,
        avg_heading,
        avg_azimuth,
        estimated_duration: format_duration(total_duration_ms),
        is_past_trip,
        trip_note,
    }
}

/// Vector mean of compass angles in degrees, None for an empty set. Plain
/// arithmetic means break on routes straddling north (350° and 10° would
/// average to 180°), so sines and cosines are summed instead.
fn circular_mean(angles: impl Iterator<Item = f64>) -> Option<f64> {
    let (mut sin, mut cos, mut n) = (0.0_f64, 0.0_f64, 0usize);
    for a in angles {
        let r = a.to_radians();
        sin += r.sin();
        cos += r.cos();
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(sin.atan2(cos).to_degrees().rem_euclid(360.0))
}

/// "1h 5m" / "12m", or None when the duration is unknown.
fn format_duration(total_ms: f64) -> Option<String> {
    if total_ms <= 0.0 {
        return None;
    }
    let minutes = ((total_ms / 60_000.0).round() as i64).max(1);
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        Some(format!("{}h {}m", h, m))
    } else {
        Some(format!("{}m", m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daylight::DaylightState;
    use chrono::TimeZone;

    fn seg(index: usize, side: SunSide) -> SegmentResult {
        SegmentResult {
            index,
            heading: 90.0,
            sun_azimuth: 180.0,
            sun_side: side,
            intensity: if side == SunSide::None { 0.0 } else { 0.5 },
            timestamp: Utc.with_ymd_and_hms(2027, 6, 21, 12, 0, 0).unwrap(),
        }
    }

    fn ctx() -> TripContext {
        TripContext {
            coordinates: vec![
                Coordinate { lat: 51.5, lon: -0.12 },
                Coordinate { lat: 51.6, lon: -0.1 },
            ],
            window: DaylightWindow {
                state: DaylightState::PolarDay,
                sunrise: None,
                sunset: None,
            },
            weather: None,
            departure: Utc.with_ymd_and_hms(2027, 6, 21, 12, 0, 0).unwrap(),
            now: Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap(),
            total_duration_ms: 0.0,
        }
    }

    #[test]
    fn test_majority_left_wins() {
        let chart = vec![
            seg(0, SunSide::Left),
            seg(1, SunSide::Left),
            seg(2, SunSide::Left),
            seg(3, SunSide::Right),
        ];
        let out = aggregate(chart, ctx());
        assert_eq!(out.sun_side, Some(SunSide::Left));
        assert_eq!(out.shade_side, Some(SunSide::Right));
        assert!((out.confidence.unwrap() - 0.5).abs() < 1e-9);
        let reason = out.reason.unwrap();
        assert!(reason.contains("3 of 4 sunlit segments"));
        assert!(reason.contains("left side"));
        assert!(out.message.is_none());
    }

    #[test]
    fn test_even_split_goes_right() {
        let chart = vec![
            seg(0, SunSide::Left),
            seg(1, SunSide::Right),
            seg(2, SunSide::Left),
            seg(3, SunSide::Right),
        ];
        let out = aggregate(chart, ctx());
        assert_eq!(out.sun_side, Some(SunSide::Right));
        assert_eq!(out.shade_side, Some(SunSide::Left));
        assert!(out.confidence.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_dark_segments_sit_out_the_vote() {
        let chart = vec![
            seg(0, SunSide::Left),
            seg(1, SunSide::Left),
            seg(2, SunSide::Right),
            seg(3, SunSide::None),
            seg(4, SunSide::None),
        ];
        let out = aggregate(chart, ctx());
        assert_eq!(out.sun_side, Some(SunSide::Left));
        // 2 of 3 sunlit, not 2 of 5
        assert!((out.confidence.unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert!(out.reason.unwrap().contains("2 of 3 sunlit segments"));
    }

    #[test]
    fn test_no_sunlit_segments_is_a_night_verdict() {
        let chart = vec![seg(0, SunSide::None), seg(1, SunSide::None)];
        let out = aggregate(chart, ctx());
        assert!(out.sun_side.is_none());
        assert!(out.shade_side.is_none());
        assert!(out.confidence.is_none());
        assert_eq!(out.message.as_deref(), Some(NO_SUNLIGHT_MESSAGE));
        assert!(out.reason.is_none());
        assert!(out.avg_azimuth.is_none());
        assert!(out.avg_heading.is_some());
        assert_eq!(out.chart_data.len(), 2);

        // On the wire the sides are explicit nulls and confidence is absent.
        let v = serde_json::to_value(&out).unwrap();
        assert!(v["sun_side"].is_null());
        assert!(v["shade_side"].is_null());
        let keys = v.as_object().unwrap();
        assert!(keys.contains_key("sun_side"));
        assert!(!keys.contains_key("confidence"));
        assert!(!keys.contains_key("reason"));
    }

    #[test]
    fn test_weather_echoed_only_with_description() {
        let mut c = ctx();
        c.weather =
            Some(WeatherReport { cloud_cover: 40.0, description: "scattered clouds".into() });
        let out = aggregate(vec![seg(0, SunSide::Left)], c);
        let w = out.weather.unwrap();
        assert_eq!(w.cloud_cover, 40.0);
        assert_eq!(w.description, "scattered clouds");

        let mut c = ctx();
        c.weather = Some(WeatherReport { cloud_cover: 40.0, description: String::new() });
        let out = aggregate(vec![seg(0, SunSide::Left)], c);
        assert!(out.weather.is_none());
    }

    #[test]
    fn test_circular_mean_straddles_north() {
        let mean = circular_mean([350.0, 10.0].into_iter()).unwrap();
        let wrapped = mean.min(360.0 - mean);
        assert!(wrapped < 1e-6, "got {}", mean);
        assert!(circular_mean(std::iter::empty()).is_none());
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(3_900_000.0).as_deref(), Some("1h 5m"));
        assert_eq!(format_duration(720_000.0).as_deref(), Some("12m"));
        assert_eq!(format_duration(30_000.0).as_deref(), Some("1m"));
        assert_eq!(format_duration(0.0), None);
    }

    #[test]
    fn test_past_departure_gets_a_note() {
        let mut c = ctx();
        c.departure = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        let out = aggregate(vec![seg(0, SunSide::Left)], c);
        assert!(out.is_past_trip);
        assert!(out.trip_note.is_some());

        let out = aggregate(vec![seg(0, SunSide::Left)], ctx());
        assert!(!out.is_past_trip);
        assert!(out.trip_note.is_none());
    }

    #[test]
    fn test_outcome_roundtrips_through_json() {
        let mut c = ctx();
        c.weather = Some(WeatherReport { cloud_cover: 10.0, description: "clear sky".into() });
        c.total_duration_ms = 3_600_000.0;
        let out = aggregate(vec![seg(0, SunSide::Left), seg(1, SunSide::Right)], c);
        let json = serde_json::to_string(&out).unwrap();
        let back: TripOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(out, back);
    }

    #[test]
    fn test_confidence_stays_in_unit_range() {
        for left in 0..=6usize {
            let chart: Vec<SegmentResult> = (0..6)
                .map(|i| seg(i, if i < left { SunSide::Left } else { SunSide::Right }))
                .collect();
            let out = aggregate(chart, ctx());
            assert!((0.0..=1.0).contains(&out.confidence.unwrap()));
        }
    }
}
