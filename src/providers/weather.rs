//! OpenWeatherMap current-conditions adapter.
//!
//! Only cloud cover and the short condition text are lifted out of the
//! response; everything else OWM sends is ignored.

use serde::Deserialize;
use std::time::Duration;

use super::{ProviderError, WeatherProvider, WeatherReport};
use crate::geometry::Coordinate;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const USER_AGENT: &str = "shadeside/0.4 (shade-side estimation)";

/// Weather source backed by the OpenWeatherMap current-weather API.
pub struct OwmWeather {
    api_key: Option<String>,
    timeout: Duration,
}

impl OwmWeather {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        OwmWeather { api_key, timeout }
    }
}

// ─── Wire format ────────────────────────────────────────────────

#[derive(Deserialize)]
struct WeatherResponse {
    #[serde(default)]
    clouds: Clouds,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Deserialize, Default)]
struct Clouds {
    #[serde(default)]
    all: f64,
}

#[derive(Deserialize)]
struct Condition {
    #[serde(default)]
    description: String,
}

fn report_from(response: WeatherResponse) -> WeatherReport {
    WeatherReport {
        cloud_cover: response.clouds.all,
        description: response
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default(),
    }
}

impl WeatherProvider for OwmWeather {
    fn current(&self, at: Coordinate) -> Result<WeatherReport, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured("WEATHER_API_KEY"))?;

        let url = format!(
            "{}?lat={}&lon={}&appid={}&units=metric",
            BASE_URL, at.lat, at.lon, key
        );

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let parsed: WeatherResponse = response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(report_from(parsed))
    }
}
