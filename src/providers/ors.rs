//! OpenRouteService driving-directions adapter.
//!
//! Calls the v2 GET endpoint and lifts the GeoJSON answer into a
//! [`RoutePlan`]. ORS hands coordinates back as `[lon, lat]` pairs; they are
//! swapped into lat/lon order here so nothing downstream has to care.

use serde::Deserialize;
use std::time::Duration;

use super::{ProviderError, RoutePlan, RouteProvider};
use crate::geometry::Coordinate;

const BASE_URL: &str = "https://api.openrouteservice.org/v2/directions/driving-car";
const USER_AGENT: &str = "shadeside/0.4 (shade-side estimation)";

/// Router backed by the OpenRouteService public API.
pub struct OrsRouter {
    api_key: Option<String>,
    timeout: Duration,
}

impl OrsRouter {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        OrsRouter { api_key, timeout }
    }
}

// ─── Wire format ────────────────────────────────────────────────

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: FeatureGeometry,
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Deserialize)]
struct FeatureGeometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Deserialize, Default)]
struct FeatureProperties {
    #[serde(default)]
    summary: RouteSummary,
}

#[derive(Deserialize, Default)]
struct RouteSummary {
    #[serde(default)]
    distance: f64,
}

fn plan_from(response: DirectionsResponse) -> Result<RoutePlan, ProviderError> {
    let feature = response.features.into_iter().next().ok_or(ProviderError::NoRoute)?;

    let points: Vec<Coordinate> = feature
        .geometry
        .coordinates
        .iter()
        .filter_map(|c| match (c.first(), c.get(1)) {
            (Some(&lon), Some(&lat)) => Some(Coordinate { lat, lon }),
            _ => None,
        })
        .collect();

    if points.len() < 2 {
        return Err(ProviderError::NoRoute);
    }

    Ok(RoutePlan { points, distance_meters: feature.properties.summary.distance })
}

impl RouteProvider for OrsRouter {
    fn plan(&self, from: Coordinate, to: Coordinate) -> Result<RoutePlan, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured("ORS_API_KEY"))?;

        let url = format!(
            "{}?api_key={}&start={},{}&end={},{}&geometry_format=geojson",
            BASE_URL, key, from.lon, from.lat, to.lon, to.lat
        );

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let parsed: DirectionsResponse = response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        plan_from(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_without_key() {
        let router = OrsRouter::new(None, Duration::from_secs(5));
        let from = Coordinate { lat: 51.5, lon: -0.12 };
        let to = Coordinate { lat: 48.85, lon: 2.35 };
        assert!(matches!(router.plan(from, to), Err(ProviderError::Unconfigured(_))));
    }

    #[test]
    fn test_parses_directions_geojson() {
        let body = r#"{
            "features": [{
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-0.12, 51.5], [-0.11, 51.52], [-0.10, 51.54]]
                },
                "properties": {"summary": {"distance": 4821.3, "duration": 512.0}}
            }]
        }"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        let plan = plan_from(parsed).unwrap();
        assert_eq!(plan.points.len(), 3);
        // lon/lat swapped into place
        assert_eq!(plan.points[0], Coordinate { lat: 51.5, lon: -0.12 });
        assert!((plan.distance_meters - 4821.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_features_is_no_route() {
        let parsed: DirectionsResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(matches!(plan_from(parsed), Err(ProviderError::NoRoute)));
    }

    #[test]
    fn test_single_point_geometry_is_no_route() {
        let body = r#"{"features": [{"geometry": {"coordinates": [[-0.12, 51.5]]}}]}"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(plan_from(parsed), Err(ProviderError::NoRoute)));
    }
}
