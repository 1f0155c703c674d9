//! Route scoring: three variants from one distance and one toll estimate
//!
//! The coefficients are estimates, not calibrated against measured trips.
//! They are kept in [`ScoringProfile`] so deployments can override them.

use serde::{Deserialize, Serialize};

use crate::models::{RouteEstimate, RouteOptions, VariantKind};
use crate::{Result, RouteError};

/// Highway preference, light congestion
pub const FASTEST_DELAY_FACTOR: f64 = 1.15;
pub const BALANCED_DELAY_FACTOR: f64 = 1.20;
/// Surface-road detour penalty for avoiding tolls
pub const CHEAPEST_DELAY_FACTOR: f64 = 1.25;

pub const FUEL_LITERS_PER_100_KM: f64 = 7.0;
pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 1.5;
pub const DEFAULT_BASE_SPEED_KMH: f64 = 80.0;

/// Lower bound on any estimated duration (one minute)
pub const MIN_DURATION_HOURS: f64 = 1.0 / 60.0;

/// Coefficients used to turn a distance into route estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    /// Price of one liter of fuel, same currency as the toll table
    pub fuel_price_per_liter: f64,
    /// Average speed before traffic adjustment
    pub base_speed_kmh: f64,
    pub fuel_liters_per_100km: f64,
    pub fastest_delay_factor: f64,
    pub cheapest_delay_factor: f64,
    pub balanced_delay_factor: f64,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            fuel_price_per_liter: DEFAULT_FUEL_PRICE_PER_LITER,
            base_speed_kmh: DEFAULT_BASE_SPEED_KMH,
            fuel_liters_per_100km: FUEL_LITERS_PER_100_KM,
            fastest_delay_factor: FASTEST_DELAY_FACTOR,
            cheapest_delay_factor: CHEAPEST_DELAY_FACTOR,
            balanced_delay_factor: BALANCED_DELAY_FACTOR,
        }
    }
}

impl ScoringProfile {
    #[must_use]
    pub fn delay_factor(&self, kind: VariantKind) -> f64 {
        match kind {
            VariantKind::Fastest => self.fastest_delay_factor,
            VariantKind::Cheapest => self.cheapest_delay_factor,
            VariantKind::Balanced => self.balanced_delay_factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fuel_price_per_liter.is_nan() {
            return Err(RouteError::configuration_missing("fuel price per liter is not set"));
        }
        if self.base_speed_kmh.is_nan() {
            return Err(RouteError::configuration_missing("base speed is not set"));
        }
        if !self.fuel_price_per_liter.is_finite() || self.fuel_price_per_liter < 0.0 {
            return Err(RouteError::validation("fuel price per liter must be zero or more"));
        }
        if !self.base_speed_kmh.is_finite() || self.base_speed_kmh <= 0.0 {
            return Err(RouteError::validation("base speed must be greater than zero"));
        }
        if !self.fuel_liters_per_100km.is_finite() || self.fuel_liters_per_100km < 0.0 {
            return Err(RouteError::validation("fuel consumption must be zero or more"));
        }
        for kind in VariantKind::ALL {
            let factor = self.delay_factor(kind);
            if !factor.is_finite() || factor < 1.0 {
                return Err(RouteError::validation(format!(
                    "{kind} traffic delay factor must be at least 1.0"
                )));
            }
        }
        Ok(())
    }

    fn estimate(&self, kind: VariantKind, distance_km: f64, toll_cost: f64) -> RouteEstimate {
        let traffic_delay_factor = self.delay_factor(kind);
        let toll_cost = match kind {
            VariantKind::Cheapest => 0.0,
            VariantKind::Fastest | VariantKind::Balanced => toll_cost,
        };
        let fuel_liters = distance_km / 100.0 * self.fuel_liters_per_100km;
        let duration_hours =
            (distance_km / self.base_speed_kmh * traffic_delay_factor).max(MIN_DURATION_HOURS);

        RouteEstimate {
            variant_kind: kind,
            distance_km,
            duration_hours,
            fuel_liters,
            toll_cost,
            total_cost: fuel_liters * self.fuel_price_per_liter + toll_cost,
            traffic_delay_factor,
        }
    }
}

/// Score the fastest, cheapest and balanced variants of a trip
///
/// Fails as a whole on invalid input; there are no partial results.
pub fn score_routes(distance_km: f64, toll_cost: f64, profile: &ScoringProfile) -> Result<RouteOptions> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(RouteError::validation(format!(
            "distance must be a non-negative number, got {distance_km}"
        )));
    }
    if !toll_cost.is_finite() || toll_cost < 0.0 {
        return Err(RouteError::validation(format!(
            "toll cost must be a non-negative number, got {toll_cost}"
        )));
    }
    profile.validate()?;

    Ok(RouteOptions::new(
        profile.estimate(VariantKind::Fastest, distance_km, toll_cost),
        profile.estimate(VariantKind::Cheapest, distance_km, toll_cost),
        profile.estimate(VariantKind::Balanced, distance_km, toll_cost),
    ))
}
