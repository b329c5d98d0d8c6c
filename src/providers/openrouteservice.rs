//! Road geometry from the OpenRouteService directions API.
//!
//! Uses the GeoJSON flavour of
//! `GET /v2/directions/{profile}?api_key=..&start=lng,lat&end=lng,lat`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::location::GeoPoint;
use crate::providers::{ProviderError, RoadGeometryProvider, RoadPath, DEFAULT_USER_AGENT};

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
const DEFAULT_PROFILE: &str = "driving-car";

#[derive(Debug, Clone)]
pub struct OpenRouteServiceConfig {
    pub base_url: String,
    pub api_key: String,
    pub profile: String,
    pub timeout: Duration,
}

impl OpenRouteServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenRouteServiceClient {
    client: Client,
    config: OpenRouteServiceConfig,
}

impl std::fmt::Debug for OpenRouteServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouteServiceClient")
            .field("base_url", &self.config.base_url)
            .field("profile", &self.config.profile)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenRouteServiceClient {
    pub fn new(config: OpenRouteServiceConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self { client, config })
    }

    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }
}

#[async_trait]
impl RoadGeometryProvider for OpenRouteServiceClient {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadPath, ProviderError> {
        let start = format!("{},{}", from.lng, from.lat);
        let end = format!("{},{}", to.lng, to.lat);

        let response = self
            .client
            .get(self.directions_url())
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::from_reqwest(&err, self.config.timeout))?
            .error_for_status()
            .map_err(|err| ProviderError::from_reqwest(&err, self.config.timeout))?;

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Parse(err.to_string()))?;

        convert_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: LineString,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    summary: Summary,
}

/// Both fields are omitted by the service for zero-length routes.
#[derive(Debug, Default, Deserialize)]
struct Summary {
    distance: Option<f64>,
    duration: Option<f64>,
}

fn convert_response(body: DirectionsResponse) -> Result<RoadPath, ProviderError> {
    let feature = body.features.into_iter().next().ok_or(ProviderError::Empty)?;

    if feature.geometry.coordinates.len() < 2 {
        return Err(ProviderError::Empty);
    }

    let points = feature
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| GeoPoint { lat, lng })
        .collect();

    Ok(RoadPath {
        points,
        distance_km: feature.properties.summary.distance.unwrap_or(0.0) / 1000.0,
        duration_minutes: feature.properties.summary.duration.unwrap_or(0.0) / 60.0,
    })
}
