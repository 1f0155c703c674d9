use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::LocationStrategy;
use crate::config::GeolocationConfig;
use crate::models::{Coordinate, Fix, LocationSource};
use crate::{Result, RouteError};

/// Approximate position from the public IP address (ipapi.co style JSON)
pub struct IpLocator {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpLocationResponse {
    fn into_fix(self) -> Result<Fix> {
        if self.error {
            let reason = self.reason.unwrap_or_else(|| "unknown reason".to_string());
            return Err(RouteError::location_unavailable(format!(
                "IP location service refused the lookup: {reason}"
            )));
        }

        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(RouteError::location_unavailable(
                "IP location response has no coordinates",
            ));
        };
        let coordinate = Coordinate::new(latitude, longitude)
            .map_err(|e| RouteError::location_unavailable(e.to_string()))?;

        let display_name = match (self.city, self.country_name) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (city, country) => city.or(country),
        };

        Ok(Fix {
            coordinate,
            display_name,
        })
    }
}

impl IpLocator {
    pub fn new(config: &GeolocationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RouteError::configuration_missing(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(client, &config.ip_location_url))
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl LocationStrategy for IpLocator {
    fn source(&self) -> LocationSource {
        LocationSource::Ip
    }

    #[instrument(skip(self))]
    async fn locate(&self) -> Result<Fix> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    RouteError::location_unavailable("IP location quota exceeded")
                }
                _ => RouteError::network(format!("IP location service returned {status}")),
            });
        }

        let body: IpLocationResponse = response.json().await.map_err(|e| {
            RouteError::location_unavailable(format!("failed to parse IP location response: {e}"))
        })?;

        let fix = body.into_fix()?;
        debug!("IP location: {}", fix.coordinate);
        Ok(fix)
    }
}
