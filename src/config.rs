//! Runtime configuration pulled from the environment.
//!
//! Provider keys are optional: a missing ORS key means straight-line routes,
//! a missing weather key means clear-sky estimates. The server still answers.

use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment-derived settings for the providers and the HTTP server.
#[derive(Debug, Clone)]
pub struct Config {
    pub ors_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub port: u16,
    /// Timeout applied to every outbound provider call.
    pub provider_timeout: Duration,
}

impl Config {
    /// Read configuration from the environment; call after `dotenvy::dotenv()`
    /// so `.env` values are visible.
    pub fn from_env() -> Self {
        Config {
            ors_api_key: non_empty(env::var("ORS_API_KEY").ok()),
            weather_api_key: non_empty(env::var("WEATHER_API_KEY").ok()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            provider_timeout: Duration::from_secs(
                env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
