//! The estimation engine: one call that stitches route planning, the
//! daylight gate, weather, per-segment analysis, and aggregation together.
//!
//! Provider degradation is absorbed here. A failed route plan falls back to
//! the straight origin→destination line, and failed weather simply means
//! clear-sky intensity; only an ephemeris failure is fatal to a request.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::aggregate::{self, TripContext, TripOutcome};
use crate::analyzer;
use crate::geometry::{self, Coordinate};
use crate::providers::{ProviderError, RoutePlan, RouteProvider, SolarEphemeris, WeatherProvider};

pub const REQUIRED_MESSAGE: &str = "origin and destination with lat/lon required";

// ─── Request types ──────────────────────────────────────────────

/// Raw request body for a shade estimate. Everything is optional at the wire
/// level; `validate` turns it into a usable query or a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShadeRequest {
    #[serde(default)]
    pub origin: Option<RawEndpoint>,
    #[serde(default)]
    pub destination: Option<RawEndpoint>,
    /// Departure time; RFC3339 or a bare `YYYY-MM-DDTHH:MM[:SS]` treated as
    /// UTC. Missing means "now".
    #[serde(default)]
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawEndpoint {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// A validated query: both endpoints in range, departure resolved.
#[derive(Debug, Clone, Copy)]
pub struct ShadeQuery {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub departure: DateTime<Utc>,
}

impl ShadeRequest {
    pub fn validate(&self) -> Result<ShadeQuery, EngineError> {
        let origin = coordinate_of(self.origin.as_ref(), "origin")?;
        let destination = coordinate_of(self.destination.as_ref(), "destination")?;

        let departure = match self.datetime.as_deref() {
            None | Some("") => Utc::now(),
            Some(raw) => parse_departure(raw).ok_or_else(|| {
                EngineError::Validation(format!("unparsable datetime: '{}'", raw))
            })?,
        };

        Ok(ShadeQuery { origin, destination, departure })
    }
}

fn coordinate_of(raw: Option<&RawEndpoint>, field: &str) -> Result<Coordinate, EngineError> {
    let raw = raw.ok_or_else(|| EngineError::Validation(REQUIRED_MESSAGE.to_string()))?;
    let (lat, lon) = match (raw.lat, raw.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(EngineError::Validation(REQUIRED_MESSAGE.to_string())),
    };
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(EngineError::Validation(format!("{}: latitude {} out of range", field, lat)));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(EngineError::Validation(format!("{}: longitude {} out of range", field, lon)));
    }
    Ok(Coordinate { lat, lon })
}

fn parse_departure(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // datetime-local inputs come through without zone or seconds
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

// ─── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum EngineError {
    /// Bad request input; maps to HTTP 400.
    Validation(String),
    /// A provider the engine cannot recover from failed; maps to HTTP 500.
    Provider(ProviderError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::Provider(e) => write!(f, "provider failure: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ProviderError> for EngineError {
    fn from(e: ProviderError) -> Self {
        EngineError::Provider(e)
    }
}

// ─── Engine ─────────────────────────────────────────────────────

/// Stateless estimator over injected providers. Cloning is cheap; every
/// request runs independently.
#[derive(Clone)]
pub struct ShadeEngine {
    router: Arc<dyn RouteProvider>,
    weather: Arc<dyn WeatherProvider>,
    ephemeris: Arc<dyn SolarEphemeris>,
}

impl ShadeEngine {
    pub fn new(
        router: Arc<dyn RouteProvider>,
        weather: Arc<dyn WeatherProvider>,
        ephemeris: Arc<dyn SolarEphemeris>,
    ) -> Self {
        ShadeEngine { router, weather, ephemeris }
    }

    /// Validate a raw request and estimate the trip.
    pub fn estimate(&self, request: &ShadeRequest) -> Result<TripOutcome, EngineError> {
        let query = request.validate()?;
        self.run(query)
    }

    /// Estimate an already-validated query.
    pub fn run(&self, query: ShadeQuery) -> Result<TripOutcome, EngineError> {
        let ShadeQuery { origin, destination, departure } = query;

        let plan = match self.router.plan(origin, destination) {
            Ok(plan) if plan.points.len() >= 2 => plan,
            Ok(_) => {
                warn!("router returned a degenerate plan, using straight line");
                RoutePlan::straight_line(origin, destination)
            }
            Err(e) => {
                warn!("route provider failed ({}), using straight line", e);
                RoutePlan::straight_line(origin, destination)
            }
        };

        let coordinates = geometry::resample(&plan.points);
        let segments = geometry::segments_of(&coordinates);
        debug!("route has {} points, {} segments", coordinates.len(), segments.len());

        // Window and gate are keyed on the departure instant at the origin.
        let window = self.ephemeris.daylight_window(departure, origin)?;
        let trip_in_daylight = window.contains(departure);

        // No sun means nothing for clouds to attenuate.
        let weather = if trip_in_daylight {
            match self.weather.current(origin) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("weather provider failed ({}), assuming clear sky", e);
                    None
                }
            }
        } else {
            None
        };
        let cloud_cover = weather.as_ref().map(|w| w.cloud_cover).unwrap_or(0.0);

        let total_duration_ms = geometry::travel_duration_ms(plan.distance_meters);
        let times = geometry::allocate_timestamps(segments.len(), departure, total_duration_ms);

        let chart = analyzer::analyze_segments(
            self.ephemeris.as_ref(),
            &segments,
            &times,
            &window,
            cloud_cover,
            trip_in_daylight,
        )?;

        info!(
            "estimated {} segments from ({:.4}, {:.4}), daylight={}",
            chart.len(),
            origin.lat,
            origin.lon,
            trip_in_daylight
        );

        Ok(aggregate::aggregate(
            chart,
            TripContext {
                coordinates,
                window,
                weather,
                departure,
                now: Utc::now(),
                total_duration_ms,
            },
        ))
    }
}
