//! Location Resolution Module
//!
//! Resolves a free-text place name, or "current location" when no name is
//! given, into coordinates. Current location is found by walking an ordered
//! list of strategies (GPS, IP geolocation, a configured manual place) and
//! taking the first one that succeeds. Nothing is cached between calls.
//! Phrases such as "here" or "home" stand for the current location only on
//! the origin side; a destination is always geocoded.

pub mod gpsd;
pub mod ip;
pub mod nominatim;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::command::is_current_location;
use crate::config::GeolocationConfig;
use crate::models::{Coordinate, Fix, LocationSource, Place};
use crate::{Result, RouteError};

pub use gpsd::GpsdLocator;
pub use ip::IpLocator;
pub use nominatim::NominatimGeocoder;

/// `raw_query` recorded for places resolved without a name
pub const CURRENT_LOCATION: &str = "current location";

/// One way of finding out where the user is right now
#[async_trait]
pub trait LocationStrategy: Send + Sync {
    fn source(&self) -> LocationSource;

    /// Whether the capability exists at all; unavailable strategies are skipped
    fn is_available(&self) -> bool {
        true
    }

    async fn locate(&self) -> Result<Fix>;
}

/// Free-text place name to coordinates
#[async_trait]
pub trait TextGeocoder: Send + Sync {
    /// Best match for `query`; `Geocode` error when nothing matches
    async fn geocode(&self, query: &str) -> Result<Fix>;
}

/// Last resort: geocode a place name the user configured as their location
pub struct ManualPlaceStrategy {
    geocoder: Arc<dyn TextGeocoder>,
    place: Option<String>,
}

impl ManualPlaceStrategy {
    pub fn new(geocoder: Arc<dyn TextGeocoder>, place: Option<String>) -> Self {
        Self { geocoder, place }
    }
}

#[async_trait]
impl LocationStrategy for ManualPlaceStrategy {
    fn source(&self) -> LocationSource {
        LocationSource::TextGeocode
    }

    fn is_available(&self) -> bool {
        self.place.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    async fn locate(&self) -> Result<Fix> {
        match self.place.as_deref() {
            Some(place) => self.geocoder.geocode(place).await,
            None => Err(RouteError::location_unavailable("no fallback place configured")),
        }
    }
}

/// Resolves route endpoints
pub struct Geolocator {
    geocoder: Arc<dyn TextGeocoder>,
    strategies: Vec<Box<dyn LocationStrategy>>,
    step_timeout: Duration,
}

impl Geolocator {
    /// `strategies` are tried in the given order for current-location queries
    pub fn new(
        geocoder: Arc<dyn TextGeocoder>,
        strategies: Vec<Box<dyn LocationStrategy>>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            strategies,
            step_timeout,
        }
    }

    /// GPS, then IP geolocation, then the configured fallback place
    pub fn from_config(config: &GeolocationConfig) -> Result<Self> {
        let geocoder: Arc<dyn TextGeocoder> = Arc::new(NominatimGeocoder::new(config)?);
        let strategies: Vec<Box<dyn LocationStrategy>> = vec![
            Box::new(GpsdLocator::new(config.gpsd_address.clone(), config.gps_enabled)),
            Box::new(IpLocator::new(config)?),
            Box::new(ManualPlaceStrategy::new(
                Arc::clone(&geocoder),
                config.fallback_place.clone(),
            )),
        ];
        Ok(Self::new(geocoder, strategies, config.timeout()))
    }

    /// Coordinates for `query`, or for the current location when absent
    pub async fn resolve(&self, query: Option<&str>) -> Result<Coordinate> {
        self.locate(query).await?.require_coordinate()
    }

    /// Like [`Geolocator::locate`], also reading "here", "home" and similar
    /// phrases as the current location
    pub async fn locate_origin(&self, query: Option<&str>) -> Result<Place> {
        let query = query.filter(|q| !is_current_location(q));
        self.locate(query).await
    }

    /// Like [`Geolocator::resolve`], keeping how the place was found
    ///
    /// Any non-blank query is geocoded as a place name.
    #[instrument(skip(self))]
    pub async fn locate(&self, query: Option<&str>) -> Result<Place> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let place = match query {
            Some(name) => self.geocode(name).await?,
            None => self.current_location().await?,
        };

        debug!(
            "Resolved '{}' to {} via {}",
            place.raw_query,
            place.require_coordinate()?,
            place.source
        );
        Ok(place)
    }

    async fn geocode(&self, name: &str) -> Result<Place> {
        debug!("Geocoding location name: {}", name);
        let fix = tokio::time::timeout(self.step_timeout, self.geocoder.geocode(name))
            .await
            .map_err(|_| RouteError::geocode(name, "geocoding service timed out"))?
            .map_err(|e| match e {
                e @ RouteError::Geocode { .. } => e,
                other => RouteError::geocode(name, other.to_string()),
            })?;
        Ok(Place::resolved(name, fix, LocationSource::TextGeocode))
    }

    async fn current_location(&self) -> Result<Place> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let source = strategy.source();
            if !strategy.is_available() {
                debug!("Skipping {}: not available", source);
                failures.push(format!("{source}: not available"));
                continue;
            }

            match tokio::time::timeout(self.step_timeout, strategy.locate()).await {
                Ok(Ok(fix)) => {
                    info!("Current location detected via {}", source);
                    return Ok(Place::resolved(CURRENT_LOCATION, fix, source));
                }
                Ok(Err(e)) => {
                    warn!("{} failed: {}", source, e);
                    failures.push(format!("{source}: {e}"));
                }
                Err(_) => {
                    warn!("{} timed out after {:?}", source, self.step_timeout);
                    failures.push(format!("{source}: timed out"));
                }
            }
        }

        Err(RouteError::location_unavailable(format!(
            "no location source succeeded ({})",
            failures.join("; ")
        )))
    }
}
