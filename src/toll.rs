//! Toll Estimation Module
//!
//! Best-effort toll estimates from a static regional table. The table is
//! loaded once at startup and shared read-only; a route whose endpoints fall
//! outside every known region is assumed to be toll free.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Coordinate, Place};
use crate::{Result, RouteError};

const BUNDLED_TOLL_TABLE: &str = include_str!("../data/toll_regions.json");

fn full_share() -> f64 {
    1.0
}

/// How a region charges for road use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TollRate {
    /// Fixed fee per trip (vignette countries)
    Flat { fee: f64 },
    /// Rate per kilometer on the tolled share of the route
    PerKm {
        rate: f64,
        #[serde(default = "full_share")]
        tolled_share: f64,
    },
}

impl TollRate {
    /// Charge for a trip of `distance_km`
    #[must_use]
    pub fn charge(&self, distance_km: f64) -> f64 {
        match *self {
            TollRate::Flat { fee } => fee,
            TollRate::PerKm { rate, tolled_share } => distance_km * rate * tolled_share,
        }
    }

    fn validate(&self, region_key: &str) -> Result<()> {
        let values = match self {
            TollRate::Flat { fee } => vec![("fee", *fee)],
            TollRate::PerKm { rate, tolled_share } => {
                if *tolled_share > 1.0 {
                    return Err(RouteError::validation(format!(
                        "toll region '{region_key}': tolled_share cannot exceed 1.0"
                    )));
                }
                vec![("rate", *rate), ("tolled_share", *tolled_share)]
            }
        };
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(RouteError::validation(format!(
                    "toll region '{region_key}': {name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Coarse latitude/longitude box of a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl RegionBounds {
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.south..=self.north).contains(&coordinate.latitude())
            && (self.west..=self.east).contains(&coordinate.longitude())
    }
}

/// One row of the toll reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollRegionEntry {
    pub region_key: String,
    pub bounds: RegionBounds,
    /// Place-name hints: `"<country>"` or `"<subdivision>, <country>"`
    ///
    /// The country part must equal the last component of a geocoder display
    /// name, any other part must equal one of its components.
    #[serde(default)]
    pub aliases: Vec<String>,
    pub rate: TollRate,
}

fn name_components(name: &str) -> Vec<String> {
    name.split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

impl TollRegionEntry {
    fn matches_name(&self, name: &str) -> bool {
        let components = name_components(name);
        let Some(country) = components.last() else {
            return false;
        };

        self.aliases.iter().any(|alias| {
            let alias = name_components(alias);
            let Some((alias_country, qualifiers)) = alias.split_last() else {
                return false;
            };
            // multilingual countries come as "Schweiz/Suisse/Svizzera"
            country.split('/').any(|c| c.trim() == alias_country)
                && qualifiers.iter().all(|q| components.contains(q))
        })
    }
}

/// Immutable toll reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollTable {
    pub edition: String,
    regions: Vec<TollRegionEntry>,
}

impl TollTable {
    /// Table compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TOLL_TABLE)
    }

    /// Parse and validate a table; earlier entries win where boxes overlap
    pub fn from_json(json: &str) -> Result<Self> {
        let table: TollTable = serde_json::from_str(json)
            .map_err(|e| RouteError::validation(format!("invalid toll table: {e}")))?;

        for entry in &table.regions {
            entry.rate.validate(&entry.region_key)?;
            let b = entry.bounds;
            if b.south > b.north || b.west > b.east {
                return Err(RouteError::validation(format!(
                    "toll region '{}': bounds are inverted",
                    entry.region_key
                )));
            }
        }
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the configured table, falling back to the bundled one
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            match Self::from_path(path) {
                Ok(table) => {
                    info!(
                        "Loaded toll table edition {} from {} ({} regions)",
                        table.edition,
                        path.display(),
                        table.len()
                    );
                    return Ok(table);
                }
                Err(e) => warn!(
                    "Could not load toll table from {}: {}, using bundled table",
                    path.display(),
                    e
                ),
            }
        }
        let table = Self::bundled()?;
        debug!("Using bundled toll table edition {}", table.edition);
        Ok(table)
    }

    /// An empty table; every estimate is zero
    #[must_use]
    pub fn empty() -> Self {
        Self {
            edition: "empty".to_string(),
            regions: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = &TollRegionEntry> {
        self.regions.iter()
    }

    /// First region whose bounds contain the coordinate
    #[must_use]
    pub fn region_for(&self, coordinate: Coordinate) -> Option<&TollRegionEntry> {
        self.regions.iter().find(|entry| entry.bounds.contains(coordinate))
    }

    /// First region with an alias matching the display `name`
    #[must_use]
    pub fn region_named(&self, name: &str) -> Option<&TollRegionEntry> {
        self.regions.iter().find(|entry| entry.matches_name(name))
    }

    /// Toll for a trip between two coordinates; zero when no region is known
    #[must_use]
    pub fn estimate_toll(&self, origin: Coordinate, destination: Coordinate, distance_km: f64) -> f64 {
        let region = self
            .region_for(origin)
            .or_else(|| self.region_for(destination));
        self.charge(region, distance_km)
    }

    /// Like [`TollTable::estimate_toll`], with display names as a second hint
    #[must_use]
    pub fn estimate_toll_for_places(&self, origin: &Place, destination: &Place, distance_km: f64) -> f64 {
        let by_coordinate = [origin, destination]
            .into_iter()
            .filter_map(|place| place.resolved_coordinate)
            .find_map(|coordinate| self.region_for(coordinate));

        let region = by_coordinate.or_else(|| {
            [origin, destination]
                .into_iter()
                .filter_map(|place| place.display_name.as_deref())
                .find_map(|name| self.region_named(name))
        });
        self.charge(region, distance_km)
    }

    fn charge(&self, region: Option<&TollRegionEntry>, distance_km: f64) -> f64 {
        if !distance_km.is_finite() || distance_km < 0.0 {
            warn!("Ignoring toll estimate for invalid distance {}", distance_km);
            return 0.0;
        }
        match region {
            Some(entry) => {
                let toll = entry.rate.charge(distance_km);
                debug!(
                    "Toll region {} applies, estimated toll {:.2} for {:.1} km",
                    entry.region_key, toll, distance_km
                );
                toll
            }
            None => {
                debug!("No toll region known for this trip, assuming no tolls");
                0.0
            }
        }
    }
}
