//! Built-in solar ephemeris backed by the NOAA position math in
//! [`crate::solar`]. No network involved; it exists behind the trait so the
//! engine treats sun geometry like any other injected dependency.

use chrono::{DateTime, Utc};

use super::{ProviderError, SolarEphemeris};
use crate::daylight::{DaylightWindow, SCAN_RESOLUTION_SECONDS};
use crate::geometry::Coordinate;
use crate::solar::{self, SunPosition};

/// The default ephemeris: pure computation, always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoaaEphemeris;

impl SolarEphemeris for NoaaEphemeris {
    fn daylight_window(
        &self,
        around: DateTime<Utc>,
        at: Coordinate,
    ) -> Result<DaylightWindow, ProviderError> {
        let samples = solar::solar_day_scan(around, at.lat, at.lon, SCAN_RESOLUTION_SECONDS);
        if samples.is_empty() {
            return Err(ProviderError::InvalidResponse("empty altitude scan".into()));
        }
        Ok(DaylightWindow::from_scan(&samples))
    }

    fn sun_position(
        &self,
        at_time: DateTime<Utc>,
        at: Coordinate,
    ) -> Result<SunPosition, ProviderError> {
        Ok(solar::sun_position(at_time, at.lat, at.lon))
    }
}
