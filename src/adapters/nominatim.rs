use crate::domain::model::Coordinates;
use crate::domain::ports::Geocoder;
use crate::utils::error::{OfferError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// OpenStreetMap Nominatim place search, scoped to one region.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    region: String,
    country_codes: String,
}

impl NominatimGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        country_codes: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        // Nominatim's usage policy rejects requests without an identifying user agent.
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            region: region.into(),
            country_codes: country_codes.into(),
        })
    }

    fn search_text(&self, name: &str) -> String {
        if self.region.trim().is_empty() {
            name.trim().to_string()
        } else {
            format!("{}, {}", name.trim(), self.region.trim())
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, name: &str) -> Result<Option<Coordinates>> {
        let q = self.search_text(name);
        tracing::debug!("Geocoding request to {} for {:?}", self.endpoint, q);

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", q.as_str()), ("format", "json"), ("limit", "1")]);
        if !self.country_codes.is_empty() {
            request = request.query(&[("countrycodes", self.country_codes.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OfferError::GeocodingError {
                message: format!("geocoder responded with HTTP {}", status),
            });
        }

        let places: Vec<serde_json::Value> = response.json().await?;
        let Some(first) = places.first() else {
            return Ok(None);
        };

        match (coordinate(first.get("lat")), coordinate(first.get("lon"))) {
            (Some(lat), Some(lng)) => Ok(Some(Coordinates::new(lat, lng)?)),
            _ => Err(OfferError::GeocodingError {
                message: format!("result for {:?} has no usable lat/lon", q),
            }),
        }
    }
}

/// Nominatim sends coordinates as strings; numbers are accepted too.
fn coordinate(value: Option<&serde_json::Value>) -> Option<f64> {
    let value = value?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
