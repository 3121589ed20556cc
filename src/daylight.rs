//! Daylight gating: is a given instant inside the sunrise→sunset window?
//!
//! Windows are classified from an altitude scan of the solar day nearest the
//! departure instant. The scan is centered on local solar noon, so sunrise
//! and sunset land in order at any longitude, including where the sunlit
//! span straddles UTC midnight. High latitudes get the two degenerate
//! states: polar day (every instant passes the gate) and polar night (none
//! do).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::solar::{self, AltitudeSample, HORIZON_ANGLE};

/// Altitude-scan step used when locating sunrise and sunset.
pub const SCAN_RESOLUTION_SECONDS: u32 = 60;

/// Shape of the day at the trip's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaylightState {
    Normal,
    PolarDay,
    PolarNight,
}

/// The sunlit span of one solar day; when both bounds are present,
/// `sunrise < sunset`. On transition days near the poles one bound can be
/// missing even in the `Normal` state; a missing bound is an open end of the
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaylightWindow {
    pub state: DaylightState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<Utc>>,
}

impl DaylightWindow {
    /// Classify a solar day from its altitude scan.
    pub fn from_scan(samples: &[AltitudeSample]) -> Self {
        let rise = solar::find_crossing(samples, HORIZON_ANGLE, true);
        let set = solar::find_crossing(samples, HORIZON_ANGLE, false);

        match (rise, set) {
            (None, None) => {
                let peak = solar::find_peak(samples);
                let state = if peak.altitude > HORIZON_ANGLE {
                    DaylightState::PolarDay
                } else {
                    DaylightState::PolarNight
                };
                DaylightWindow { state, sunrise: None, sunset: None }
            }
            (rise, set) => DaylightWindow {
                state: DaylightState::Normal,
                sunrise: rise,
                sunset: set,
            },
        }
    }

    /// True when `at` falls inside the sunlit window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match self.state {
            DaylightState::PolarDay => true,
            DaylightState::PolarNight => false,
            DaylightState::Normal => {
                let after_rise = self.sunrise.map_or(true, |r| at >= r);
                let before_set = self.sunset.map_or(true, |s| at <= s);
                after_rise && before_set
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window(at: DateTime<Utc>, lat: f64, lon: f64) -> DaylightWindow {
        let samples = solar::solar_day_scan(at, lat, lon, SCAN_RESOLUTION_SECONDS);
        DaylightWindow::from_scan(&samples)
    }

    #[test]
    fn test_london_summer_window_brackets_noon() {
        let noon = Utc.with_ymd_and_hms(2026, 6, 21, 12, 0, 0).unwrap();
        let w = window(noon, 51.5074, -0.1278);
        assert_eq!(w.state, DaylightState::Normal);
        assert!(w.contains(noon));
        assert!(w.sunrise.unwrap() < noon);
        assert!(w.sunset.unwrap() > noon);
    }

    #[test]
    fn test_london_night_hours_rejected() {
        let small_hours = Utc.with_ymd_and_hms(2026, 6, 21, 1, 30, 0).unwrap();
        assert!(!window(small_hours, 51.5074, -0.1278).contains(small_hours));
        let late = Utc.with_ymd_and_hms(2026, 6, 21, 22, 30, 0).unwrap();
        assert!(!window(late, 51.5074, -0.1278).contains(late));
    }

    #[test]
    fn test_tokyo_daylight_spans_utc_midnight() {
        // 10:00 JST. Tokyo's sunlit span opens on the previous UTC date, so
        // the window must follow the solar day, not the calendar date.
        let mid_morning = Utc.with_ymd_and_hms(2026, 6, 21, 1, 0, 0).unwrap();
        let w = window(mid_morning, 35.6762, 139.6503);
        assert_eq!(w.state, DaylightState::Normal);
        assert!(w.contains(mid_morning));

        let (sunrise, sunset) = (w.sunrise.unwrap(), w.sunset.unwrap());
        assert!(sunrise < sunset);
        assert!(sunrise < Utc.with_ymd_and_hms(2026, 6, 21, 0, 0, 0).unwrap());
        assert!(sunset > Utc.with_ymd_and_hms(2026, 6, 21, 9, 0, 0).unwrap());
        assert!(sunset < Utc.with_ymd_and_hms(2026, 6, 21, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_new_york_late_evening_rejected() {
        // 23:00 EDT on June 21st is 03:00 UTC on the 22nd, past sunset.
        let late_evening = Utc.with_ymd_and_hms(2026, 6, 22, 3, 0, 0).unwrap();
        let w = window(late_evening, 40.7128, -74.0060);
        assert_eq!(w.state, DaylightState::Normal);
        assert!(!w.contains(late_evening));

        let (sunrise, sunset) = (w.sunrise.unwrap(), w.sunset.unwrap());
        assert!(sunrise < sunset);
        assert!(sunset < late_evening);
        // Local noon of that same solar day sits inside the window.
        assert!(w.contains(Utc.with_ymd_and_hms(2026, 6, 21, 17, 0, 0).unwrap()));
    }

    #[test]
    fn test_tromso_polar_day_accepts_midnight() {
        let midnight = Utc.with_ymd_and_hms(2026, 6, 21, 0, 0, 0).unwrap();
        let w = window(midnight, 69.6492, 18.9553);
        assert_eq!(w.state, DaylightState::PolarDay);
        assert!(w.sunrise.is_none() && w.sunset.is_none());
        assert!(w.contains(midnight));
    }

    #[test]
    fn test_svalbard_polar_night_rejects_noon() {
        let noon = Utc.with_ymd_and_hms(2025, 12, 21, 12, 0, 0).unwrap();
        let w = window(noon, 78.2232, 15.6267);
        assert_eq!(w.state, DaylightState::PolarNight);
        assert!(!w.contains(noon));
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let v = serde_json::to_value(DaylightState::PolarDay).unwrap();
        assert_eq!(v, serde_json::json!("polar_day"));
        assert_eq!(
            serde_json::to_value(DaylightState::Normal).unwrap(),
            serde_json::json!("normal")
        );
    }

    #[test]
    fn test_window_roundtrips_through_json() {
        let noon = Utc.with_ymd_and_hms(2026, 6, 21, 12, 0, 0).unwrap();
        let w = window(noon, 51.5074, -0.1278);
        let json = serde_json::to_string(&w).unwrap();
        let back: DaylightWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}
