//! Solar position math based on the simplified NOAA algorithm.
//!
//! Computes altitude and azimuth for any instant and WGS84 location, plus the
//! solar-day scan the daylight gate uses to locate sunrise and sunset.
//! Accuracy is ~0.01° for dates within ±50 years of J2000, which is far
//! tighter than seat-side estimation needs.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;
const ATMOSPHERIC_REFRACTION: f64 = 0.833;

/// Horizon angle adjusted for refraction; the sun is "up" above this.
pub const HORIZON_ANGLE: f64 = -ATMOSPHERIC_REFRACTION;

/// Where the sun sits in the sky: altitude above the horizon and compass
/// azimuth (0° = north, 90° = east, clockwise), both in degrees.
#[derive(Debug, Clone, Copy)]
pub struct SunPosition {
    pub altitude: f64,
    pub azimuth: f64,
}

/// A timestamped altitude sample from a solar-day scan.
#[derive(Debug, Clone, Copy)]
pub struct AltitudeSample {
    pub at: DateTime<Utc>,
    pub altitude: f64,
}

/// Convert a NaiveDateTime (assumed UTC) to Julian Date.
fn julian_date(dt: &NaiveDateTime) -> f64 {
    let y = dt.year() as f64;
    let m = dt.month() as f64;
    let d = dt.day() as f64;
    let h = dt.hour() as f64 + dt.minute() as f64 / 60.0 + dt.second() as f64 / 3600.0;

    let (y2, m2) = if m <= 2.0 {
        (y - 1.0, m + 12.0)
    } else {
        (y, m)
    };

    let a = (y2 / 100.0_f64).floor();
    let b = 2.0 - a + (a / 4.0_f64).floor();

    (365.25_f64 * (y2 + 4716.0)).floor()
        + (30.6001_f64 * (m2 + 1.0)).floor()
        + d
        + h / 24.0
        + b
        - 1524.5
}

fn normalize_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d < 0.0 {
        d += 360.0;
    }
    d
}

/// Declination (degrees) and equation of time (minutes) for a Julian century.
/// Both fall out of the same NOAA series, so they are computed together.
fn declination_and_eqtime(t: f64) -> (f64, f64) {
    let l0 = normalize_degrees(280.46646 + t * (36000.76983 + t * 0.0003032));
    let m = normalize_degrees(357.52911 + t * (35999.05029 - t * 0.0001537));
    let ecc = 0.016708634 - t * (0.000042037 + t * 0.0000001267);

    let m_r = m * DEG;
    let center = m_r.sin() * (1.914602 - t * (0.004817 + t * 0.000014))
        + (2.0 * m_r).sin() * (0.019993 - t * 0.000101)
        + (3.0 * m_r).sin() * 0.000289;

    let omega = 125.04 - 1934.136 * t;
    let apparent = l0 + center - 0.00569 - 0.00478 * (omega * DEG).sin();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.00256 * (omega * DEG).cos()) * DEG;

    let declination = (obliquity.sin() * (apparent * DEG).sin()).asin() / DEG;

    let y = (obliquity / 2.0).tan().powi(2);
    let l0_r = l0 * DEG;
    let eq = y * (2.0 * l0_r).sin() - 2.0 * ecc * m_r.sin()
        + 4.0 * ecc * y * m_r.sin() * (2.0 * l0_r).cos()
        - 0.5 * y * y * (4.0 * l0_r).sin()
        - 1.25 * ecc * ecc * (2.0 * m_r).sin();

    (declination, 4.0 * eq / DEG)
}

fn position_at(dt: &NaiveDateTime, lat: f64, lon: f64) -> SunPosition {
    let jd = julian_date(dt);
    let t = (jd - 2451545.0) / 36525.0;
    let (decl, eqtime) = declination_and_eqtime(t);

    let hour = dt.hour() as f64 + dt.minute() as f64 / 60.0 + dt.second() as f64 / 3600.0;
    let solar_time = hour * 60.0 + eqtime + 4.0 * lon;
    let hour_angle = solar_time / 4.0 - 180.0;

    let lat_r = lat * DEG;
    let decl_r = decl * DEG;
    let ha_r = hour_angle * DEG;

    let sin_alt = lat_r.sin() * decl_r.sin() + lat_r.cos() * decl_r.cos() * ha_r.cos();
    let alt_r = sin_alt.asin();
    let altitude = alt_r / DEG;

    let azimuth = if lat_r.cos().abs() > 1e-10 {
        let cos_az = (decl_r.sin() - alt_r.sin() * lat_r.sin()) / (alt_r.cos() * lat_r.cos());
        let az = cos_az.clamp(-1.0, 1.0).acos() / DEG;
        if hour_angle > 0.0 { 360.0 - az } else { az }
    } else {
        // At the poles every direction is the meridian.
        if decl > 0.0 { 180.0 } else { 0.0 }
    };

    SunPosition { altitude, azimuth: normalize_degrees(azimuth) }
}

/// Solar position at a UTC instant for the given latitude and longitude.
pub fn sun_position(at: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition {
    position_at(&at.naive_utc(), lat, lon)
}

/// Mean solar noon closest to `around` for the given longitude. The equation
/// of time shifts the true transit by up to ~16 minutes, which is irrelevant
/// here: the noon only anchors a ±12 h scan.
fn nearest_solar_noon(around: DateTime<Utc>, lon: f64) -> DateTime<Utc> {
    let midnight = around.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let offset_ms = ((12.0 - lon / 15.0) * 3_600_000.0).round() as i64;
    let mut noon = midnight + Duration::milliseconds(offset_ms);
    if noon - around > Duration::hours(12) {
        noon = noon - Duration::days(1);
    } else if around - noon > Duration::hours(12) {
        noon = noon + Duration::days(1);
    }
    noon
}

/// Scan the 24-hour altitude curve of the solar day nearest `around`. The
/// sweep is centered on local solar noon, so within one scan the sun rises
/// at most once and sets at most once, in that order, at any longitude.
pub fn solar_day_scan(
    around: DateTime<Utc>,
    lat: f64,
    lon: f64,
    resolution_seconds: u32,
) -> Vec<AltitudeSample> {
    let start = nearest_solar_noon(around, lon) - Duration::hours(12);
    let mut samples = Vec::new();
    let mut sec = 0u32;
    while sec < 86400 {
        let at = start + Duration::seconds(sec as i64);
        let pos = position_at(&at.naive_utc(), lat, lon);
        samples.push(AltitudeSample { at, altitude: pos.altitude });
        sec += resolution_seconds;
    }
    samples
}

/// Highest sample of a scan. Panics on an empty scan, which `solar_day_scan`
/// never produces for a sane resolution.
pub fn find_peak(samples: &[AltitudeSample]) -> AltitudeSample {
    *samples
        .iter()
        .max_by(|a, b| a.altitude.partial_cmp(&b.altitude).unwrap())
        .unwrap()
}

/// Find the first crossing of a target altitude (ascending or descending).
/// Returns the interpolated instant, or None if no crossing occurs.
pub fn find_crossing(
    samples: &[AltitudeSample],
    target: f64,
    ascending: bool,
) -> Option<DateTime<Utc>> {
    for window in samples.windows(2) {
        let (a, b) = (window[0], window[1]);
        let crosses = if ascending {
            a.altitude <= target && b.altitude > target
        } else {
            a.altitude >= target && b.altitude < target
        };
        if crosses {
            let frac = (target - a.altitude) / (b.altitude - a.altitude);
            let step_ms = (b.at - a.at).num_milliseconds() as f64;
            return Some(a.at + Duration::milliseconds((frac * step_ms).round() as i64));
        }
    }
    None
}
