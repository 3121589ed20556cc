//! Provider seams: route planning, weather, and the solar ephemeris.
//!
//! The engine only ever talks to these traits, so tests swap in stubs and
//! the HTTP adapters stay at the edge of the system.

pub mod ephemeris;
pub mod ors;
pub mod weather;

use chrono::{DateTime, Utc};
use std::fmt;

use crate::daylight::DaylightWindow;
use crate::geometry::Coordinate;
use crate::solar::SunPosition;

// ─── Errors ─────────────────────────────────────────────────────

/// Errors surfaced by the outward-facing providers.
#[derive(Debug)]
pub enum ProviderError {
    /// A credential the provider needs is missing from the environment.
    Unconfigured(&'static str),
    Network(String),
    InvalidResponse(String),
    /// The router answered but produced no usable route.
    NoRoute,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured(key) => write!(f, "provider not configured: {} is unset", key),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid provider response: {}", msg),
            Self::NoRoute => write!(f, "no route between the given points"),
        }
    }
}

impl std::error::Error for ProviderError {}

// ─── Provider payloads ──────────────────────────────────────────

/// A planned route: ordered polyline plus total length in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub points: Vec<Coordinate>,
    pub distance_meters: f64,
}

impl RoutePlan {
    /// Degenerate two-point plan used when no router is available. Distance
    /// is unknown, so the time model collapses to the departure instant.
    pub fn straight_line(from: Coordinate, to: Coordinate) -> Self {
        RoutePlan { points: vec![from, to], distance_meters: 0.0 }
    }
}

/// Cloud conditions near a point.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Cloud cover percentage, 0–100.
    pub cloud_cover: f64,
    /// Short human-readable condition ("scattered clouds"); may be empty.
    pub description: String,
}

// ─── Traits ─────────────────────────────────────────────────────

/// Plans a driving path between two coordinates.
pub trait RouteProvider: Send + Sync {
    fn plan(&self, from: Coordinate, to: Coordinate) -> Result<RoutePlan, ProviderError>;
}

/// Supplies current cloud conditions near a point.
pub trait WeatherProvider: Send + Sync {
    fn current(&self, at: Coordinate) -> Result<WeatherReport, ProviderError>;
}

/// Sun geometry for any instant and place.
pub trait SolarEphemeris: Send + Sync {
    /// The sunlit window of the solar day nearest `around`, seen from `at`.
    fn daylight_window(&self, around: DateTime<Utc>, at: Coordinate)
        -> Result<DaylightWindow, ProviderError>;

    /// Altitude and azimuth of the sun at a UTC instant, seen from `at`.
    fn sun_position(&self, at_time: DateTime<Utc>, at: Coordinate)
        -> Result<SunPosition, ProviderError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = ProviderError::Unconfigured("ORS_API_KEY");
        assert!(e.to_string().contains("ORS_API_KEY"));
        assert_eq!(ProviderError::NoRoute.to_string(), "no route between the given points");
    }

    #[test]
    fn test_straight_line_plan() {
        let from = Coordinate { lat: 51.5, lon: -0.12 };
        let to = Coordinate { lat: 48.85, lon: 2.35 };
        let plan = RoutePlan::straight_line(from, to);
        assert_eq!(plan.points, vec![from, to]);
        assert_eq!(plan.distance_meters, 0.0);
    }
}
