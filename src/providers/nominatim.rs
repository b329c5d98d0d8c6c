//! Address lookup against a Nominatim-compatible `/search` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::location::GeoPoint;
use crate::providers::{DEFAULT_USER_AGENT, Geocoder, ProviderError};

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for NominatimGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimGeocoder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|err| ProviderError::from_reqwest(&err, self.timeout))?
            .error_for_status()
            .map_err(|err| ProviderError::from_reqwest(&err, self.timeout))?;

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|err| ProviderError::Parse(err.to_string()))?;

        first_point(places)
    }
}

/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

fn first_point(places: Vec<Place>) -> Result<GeoPoint, ProviderError> {
    let place = places.into_iter().next().ok_or(ProviderError::Empty)?;

    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|err| ProviderError::Parse(format!("lat {:?}: {err}", place.lat)))?;
    let lng = place
        .lon
        .parse::<f64>()
        .map_err(|err| ProviderError::Parse(format!("lon {:?}: {err}", place.lon)))?;

    Ok(GeoPoint { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_strips_trailing_slash() {
        let geocoder =
            NominatimGeocoder::new("http://geo.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(geocoder.search_url(), "http://geo.example.com/search");
    }

    #[test]
    fn first_result_is_parsed_from_strings() {
        let json = r#"[
            {"lat": "53.5503", "lon": "10.0006", "display_name": "Rathaus, Hamburg"},
            {"lat": "0", "lon": "0"}
        ]"#;
        let places: Vec<Place> = serde_json::from_str(json).unwrap();

        let point = first_point(places).unwrap();

        assert_eq!(point, GeoPoint::new(53.5503, 10.0006));
    }

    #[test]
    fn no_results_is_empty_error() {
        assert!(matches!(first_point(Vec::new()), Err(ProviderError::Empty)));
    }

    #[test]
    fn garbage_coordinates_are_parse_errors() {
        let places = vec![Place {
            lat: "north".to_string(),
            lon: "10.0".to_string(),
        }];
        assert!(matches!(first_point(places), Err(ProviderError::Parse(_))));
    }
}
