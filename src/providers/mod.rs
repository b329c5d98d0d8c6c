//! Ports to external routing and geocoding services.
//!
//! Both are best-effort: callers wrap every call in a short timeout and
//! substitute a straight line or a default coordinate on failure. A
//! [`ProviderError`] is logged, never surfaced to an HTTP client.

pub mod nominatim;
pub mod openrouteservice;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::location::GeoPoint;

pub const DEFAULT_USER_AGENT: &str = "routiqo/0.1";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider returned status {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("unparseable provider response: {0}")]
    Parse(String),

    #[error("provider returned no result")]
    Empty,
}

impl ProviderError {
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return ProviderError::Timeout(timeout);
        }
        if let Some(status) = err.status() {
            return ProviderError::Http {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return ProviderError::Parse(err.to_string());
        }
        ProviderError::Network(err.to_string())
    }
}

/// Road path between two points as reported by a routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPath {
    pub points: Vec<GeoPoint>,
    pub distance_km: f64,
    pub duration_minutes: f64,
}

#[async_trait]
pub trait RoadGeometryProvider: Send + Sync {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadPath, ProviderError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError>;
}

/// Explicit coordinates win; otherwise the address is geocoded, falling back
/// to `default` when no geocoder is configured or the lookup fails.
pub async fn resolve_location(
    explicit: Option<GeoPoint>,
    address: &str,
    geocoder: Option<&dyn Geocoder>,
    timeout: Duration,
    default: GeoPoint,
) -> GeoPoint {
    if let Some(point) = explicit {
        return point;
    }

    let Some(geocoder) = geocoder else {
        warn!(address, "no geocoder configured; using default coordinate");
        return default;
    };

    match tokio::time::timeout(timeout, geocoder.geocode(address)).await {
        Ok(Ok(point)) if point.is_valid() => point,
        Ok(Ok(point)) => {
            warn!(
                address,
                lat = point.lat,
                lng = point.lng,
                "geocoder returned invalid point; using default coordinate"
            );
            default
        }
        Ok(Err(err)) => {
            warn!(address, error = %err, "geocoding failed; using default coordinate");
            default
        }
        Err(_) => {
            warn!(
                address,
                timeout_ms = timeout.as_millis() as u64,
                "geocoding timed out; using default coordinate"
            );
            default
        }
    }
}
