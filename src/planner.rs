//! Route planning pipeline
//!
//! Resolve both endpoints, measure the great-circle distance, estimate
//! tolls, score the three variants and build the navigation URL for the
//! variant that gets handed off. Handoff itself is a separate step so a
//! failed plan can never open anything.

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::RoutePlannerConfig;
use crate::distance::distance;
use crate::error::Endpoint;
use crate::geolocation::Geolocator;
use crate::models::{Place, RouteEstimate, RouteOptions, VariantKind};
use crate::navigation::NavigationHandoff;
use crate::scoring::{ScoringProfile, score_routes};
use crate::toll::TollTable;
use crate::{Result, RouteError};

/// Outcome of one route query
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub origin: Place,
    pub destination: Place,
    pub distance_km: f64,
    /// Toll of a tolled route; the cheapest variant always carries zero
    pub estimated_toll: f64,
    pub options: RouteOptions,
    /// Variant the navigation URL was built for
    pub chosen: VariantKind,
    pub navigation_url: String,
}

impl RoutePlan {
    #[must_use]
    pub fn chosen_route(&self) -> &RouteEstimate {
        self.options.get(self.chosen)
    }

    /// What the assistant says, one line per option
    #[must_use]
    pub fn announcement(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Found {} route options from {} to {}.",
            self.options.len(),
            self.origin.label(),
            self.destination.label()
        )];
        lines.extend(
            self.options
                .iter()
                .enumerate()
                .map(|(i, estimate)| format!("Option {}: {}", i + 1, estimate.summary())),
        );
        lines
    }
}

pub struct RoutePlanner<'t> {
    geolocator: Geolocator,
    tolls: &'t TollTable,
    profile: ScoringProfile,
    handoff: NavigationHandoff,
    handoff_variant: VariantKind,
}

impl<'t> RoutePlanner<'t> {
    pub fn new(
        geolocator: Geolocator,
        tolls: &'t TollTable,
        profile: ScoringProfile,
        handoff: NavigationHandoff,
        handoff_variant: VariantKind,
    ) -> Self {
        Self {
            geolocator,
            tolls,
            profile,
            handoff,
            handoff_variant,
        }
    }

    pub fn from_config(config: &RoutePlannerConfig, tolls: &'t TollTable) -> Result<Self> {
        Ok(Self::new(
            Geolocator::from_config(&config.geolocation)?,
            tolls,
            config.estimation.clone(),
            NavigationHandoff::new(&config.navigation.base_url, config.navigation.open_browser),
            config.navigation.handoff_variant,
        ))
    }

    pub fn geolocator(&self) -> &Geolocator {
        &self.geolocator
    }

    /// Plan a trip from `origin` (current location when absent) to `destination`
    #[instrument(skip(self))]
    pub async fn plan(&self, origin: Option<&str>, destination: &str) -> Result<RoutePlan> {
        if destination.trim().is_empty() {
            return Err(RouteError::validation("destination must not be empty"));
        }

        let (origin, destination) = tokio::join!(
            self.geolocator.locate_origin(origin),
            self.geolocator.locate(Some(destination))
        );
        let origin = origin.map_err(|e| e.for_endpoint(Endpoint::Origin))?;
        let destination = destination.map_err(|e| e.for_endpoint(Endpoint::Destination))?;

        let from = origin.require_coordinate()?;
        let to = destination.require_coordinate()?;

        let distance_km = distance(from, to);
        let estimated_toll = self
            .tolls
            .estimate_toll_for_places(&origin, &destination, distance_km);
        let options = score_routes(distance_km, estimated_toll, &self.profile)?;

        let chosen = self.handoff_variant;
        let navigation_url = self.handoff.request_url(from, to, Some(chosen));

        info!(
            "Planned {:.1} km from {} to {}, toll estimate {:.2}",
            distance_km,
            origin.label(),
            destination.label(),
            estimated_toll
        );

        Ok(RoutePlan {
            origin,
            destination,
            distance_km,
            estimated_toll,
            options,
            chosen,
            navigation_url,
        })
    }

    /// Open the plan's navigation URL; `false` when opening is disabled
    pub fn hand_off(&self, plan: &RoutePlan) -> Result<bool> {
        self.handoff.hand_off(&plan.navigation_url)
    }
}
