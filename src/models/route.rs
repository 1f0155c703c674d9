//! Route estimate model: one estimate per variant, always three together

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RouteError;

/// Road preference a route estimate was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// Highways preferred, tolls paid
    Fastest,
    /// Toll roads avoided
    Cheapest,
    Balanced,
}

impl VariantKind {
    /// All variants in presentation order
    pub const ALL: [VariantKind; 3] = [
        VariantKind::Fastest,
        VariantKind::Cheapest,
        VariantKind::Balanced,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Fastest => "Fastest Route",
            VariantKind::Cheapest => "Cheapest Route",
            VariantKind::Balanced => "Balanced Route",
        }
    }

    #[must_use]
    pub fn road_preference(self) -> &'static str {
        match self {
            VariantKind::Fastest => "highways preferred",
            VariantKind::Cheapest => "avoids tolls",
            VariantKind::Balanced => "balanced",
        }
    }

    fn index(self) -> usize {
        match self {
            VariantKind::Fastest => 0,
            VariantKind::Cheapest => 1,
            VariantKind::Balanced => 2,
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Fastest => write!(f, "fastest"),
            VariantKind::Cheapest => write!(f, "cheapest"),
            VariantKind::Balanced => write!(f, "balanced"),
        }
    }
}

impl FromStr for VariantKind {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fastest" => Ok(VariantKind::Fastest),
            "cheapest" => Ok(VariantKind::Cheapest),
            "balanced" => Ok(VariantKind::Balanced),
            other => Err(RouteError::validation(format!(
                "unknown route variant '{other}', expected fastest, cheapest or balanced"
            ))),
        }
    }
}

/// Estimated cost and time of one route variant
///
/// Only built by the scorer, never read back in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteEstimate {
    pub variant_kind: VariantKind,
    pub distance_km: f64,
    /// Base travel time inflated by `traffic_delay_factor`
    pub duration_hours: f64,
    pub fuel_liters: f64,
    pub toll_cost: f64,
    /// `fuel_liters * fuel price + toll_cost`
    pub total_cost: f64,
    pub traffic_delay_factor: f64,
}

impl RouteEstimate {
    /// Duration in whole minutes, rounded
    #[must_use]
    pub fn duration_minutes(&self) -> u64 {
        // duration_hours is finite and positive
        (self.duration_hours * 60.0).round() as u64
    }

    /// One sentence describing this option, as the assistant announces it
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {:.1} kilometers, about {} minutes with traffic ({}). Fuel: {:.1} liters, tolls: {:.2}, total cost: {:.2}",
            self.variant_kind.label(),
            self.distance_km,
            self.duration_minutes(),
            self.variant_kind.road_preference(),
            self.fuel_liters,
            self.toll_cost,
            self.total_cost
        )
    }
}

/// The three estimates of a route query, ordered fastest, cheapest, balanced
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteOptions([RouteEstimate; 3]);

impl RouteOptions {
    /// Build the set; each estimate must carry its own kind
    pub(crate) fn new(fastest: RouteEstimate, cheapest: RouteEstimate, balanced: RouteEstimate) -> Self {
        debug_assert_eq!(fastest.variant_kind, VariantKind::Fastest);
        debug_assert_eq!(cheapest.variant_kind, VariantKind::Cheapest);
        debug_assert_eq!(balanced.variant_kind, VariantKind::Balanced);
        Self([fastest, cheapest, balanced])
    }

    #[must_use]
    pub fn get(&self, kind: VariantKind) -> &RouteEstimate {
        &self.0[kind.index()]
    }

    #[must_use]
    pub fn fastest(&self) -> &RouteEstimate {
        self.get(VariantKind::Fastest)
    }

    #[must_use]
    pub fn cheapest(&self) -> &RouteEstimate {
        self.get(VariantKind::Cheapest)
    }

    #[must_use]
    pub fn balanced(&self) -> &RouteEstimate {
        self.get(VariantKind::Balanced)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteEstimate> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a RouteOptions {
    type Item = &'a RouteEstimate;
    type IntoIter = std::slice::Iter<'a, RouteEstimate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
