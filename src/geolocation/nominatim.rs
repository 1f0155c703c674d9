use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::TextGeocoder;
use crate::config::GeolocationConfig;
use crate::models::{Coordinate, Fix};
use crate::{Result, RouteError};

/// Nominatim search API client
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

/// One search hit; Nominatim sends coordinates as strings
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl SearchResult {
    fn into_fix(self, query: &str) -> Result<Fix> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| RouteError::geocode(query, format!("malformed {axis} '{value}'")))
        };
        let coordinate = Coordinate::new(parse(&self.lat, "latitude")?, parse(&self.lon, "longitude")?)
            .map_err(|e| RouteError::geocode(query, e.to_string()))?;

        Ok(Fix {
            coordinate,
            display_name: self.display_name,
        })
    }
}

impl NominatimGeocoder {
    pub fn new(config: &GeolocationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RouteError::configuration_missing(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(client, &config.geocoding_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextGeocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Fix> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| RouteError::geocode(query, format!("geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    RouteError::geocode(query, "geocoding service rate limit exceeded")
                }
                _ => RouteError::geocode(query, format!("geocoding service returned {status}")),
            });
        }

        let results: Vec<SearchResult> = response.json().await.map_err(|e| {
            RouteError::geocode(query, format!("failed to parse geocoding response: {e}"))
        })?;

        let fix = results
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::geocode(query, "no matching place found"))?
            .into_fix(query)?;

        debug!("Geocoded '{}' to {}", query, fix.coordinate);
        Ok(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(lat: &str, lon: &str) -> SearchResult {
        SearchResult {
            lat: lat.to_string(),
            lon: lon.to_string(),
            display_name: Some("Interlaken, Schweiz".to_string()),
        }
    }

    #[test]
    fn test_search_result_parses_string_coordinates() {
        let fix = hit("46.6863", "7.8632").into_fix("Interlaken").unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(46.6863, 7.8632).unwrap());
        assert_eq!(fix.display_name.as_deref(), Some("Interlaken, Schweiz"));
    }

    #[test]
    fn test_search_result_rejects_garbage() {
        let err = hit("north", "7.8632").into_fix("Interlaken").unwrap_err();
        assert!(matches!(err, RouteError::Geocode { ref query, .. } if query == "Interlaken"));

        let err = hit("91.5", "7.8632").into_fix("Interlaken").unwrap_err();
        assert!(matches!(err, RouteError::Geocode { ref query, .. } if query == "Interlaken"));
    }

    #[test]
    fn test_response_shape() {
        let body = r#"[{"place_id":1,"lat":"52.5170365","lon":"13.3888599","display_name":"Berlin, Deutschland","class":"boundary"}]"#;
        let results: Vec<SearchResult> = serde_json::from_str(body).unwrap();
        assert_eq!(results.len(), 1);
        let fix = results.into_iter().next().unwrap().into_fix("Berlin").unwrap();
        assert!((fix.coordinate.latitude() - 52.5170365).abs() < 1e-9);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let geocoder = NominatimGeocoder::with_client(Client::new(), "http://localhost:8080/");
        assert_eq!(geocoder.base_url, "http://localhost:8080");
    }
}
