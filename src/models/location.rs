//! Location model for geographic coordinates and resolved places

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, RouteError};

/// Validated WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = RouteError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside [-90,90] / [-180,180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let query = format!("{latitude},{longitude}");
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RouteError::geocode(query, "latitude must be within [-90, 90]"));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RouteError::geocode(query, "longitude must be within [-180, 180]"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// `lat,lon` with six decimals (about 0.1 m), as map services expect it
    #[must_use]
    pub fn to_query_pair(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_coordinates())
    }
}

/// Where a resolved position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationSource {
    Gps,
    Ip,
    TextGeocode,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSource::Gps => write!(f, "GPS"),
            LocationSource::Ip => write!(f, "IP geolocation"),
            LocationSource::TextGeocode => write!(f, "text geocoding"),
        }
    }
}

/// A position produced by one location strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Human readable name reported by the service, if any
    pub display_name: Option<String>,
}

impl Fix {
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            display_name: None,
        }
    }

    #[must_use]
    pub fn named(coordinate: Coordinate, display_name: impl Into<String>) -> Self {
        Self {
            coordinate,
            display_name: Some(display_name.into()),
        }
    }
}

/// One endpoint of a route query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    /// What the user asked for
    pub raw_query: String,
    pub resolved_coordinate: Option<Coordinate>,
    pub source: LocationSource,
    pub display_name: Option<String>,
}

impl Place {
    /// Place that has not been looked up yet
    #[must_use]
    pub fn unresolved(raw_query: impl Into<String>, source: LocationSource) -> Self {
        Self {
            raw_query: raw_query.into(),
            resolved_coordinate: None,
            source,
            display_name: None,
        }
    }

    #[must_use]
    pub fn resolved(raw_query: impl Into<String>, fix: Fix, source: LocationSource) -> Self {
        Self {
            raw_query: raw_query.into(),
            resolved_coordinate: Some(fix.coordinate),
            source,
            display_name: fix.display_name,
        }
    }

    /// The resolved coordinate, or `LocationUnavailable` when lookup never succeeded
    pub fn require_coordinate(&self) -> Result<Coordinate> {
        self.resolved_coordinate.ok_or_else(|| {
            RouteError::location_unavailable(format!("'{}' has not been resolved", self.raw_query))
        })
    }

    /// Name used when talking about this place
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.raw_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_coordinate_accessors() {
        let coordinate = Coordinate::new(46.8182, 8.2275).unwrap();
        assert_eq!(coordinate.latitude(), 46.8182);
        assert_eq!(coordinate.longitude(), 8.2275);
        assert_eq!(coordinate.format_coordinates(), "46.8182, 8.2275");
        assert_eq!(coordinate.to_query_pair(), "46.818200,8.227500");
    }

    #[rstest]
    #[case(90.1, 0.0)]
    #[case(-90.1, 0.0)]
    #[case(0.0, 180.5)]
    #[case(0.0, -181.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn test_invalid_coordinates_rejected(#[case] lat: f64, #[case] lon: f64) {
        let err = Coordinate::new(lat, lon).unwrap_err();
        assert!(matches!(err, RouteError::Geocode { .. }));
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn test_boundary_coordinates_accepted(#[case] lat: f64, #[case] lon: f64) {
        assert!(Coordinate::new(lat, lon).is_ok());
    }

    #[test]
    fn test_coordinate_deserialization_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude": 48.1, "longitude": 11.5}"#).unwrap();
        assert_eq!(ok.latitude(), 48.1);

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 123.0, "longitude": 11.5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_place_resolution() {
        let unresolved = Place::unresolved("Interlaken", LocationSource::TextGeocode);
        assert!(matches!(
            unresolved.require_coordinate(),
            Err(RouteError::LocationUnavailable { .. })
        ));
        assert_eq!(unresolved.label(), "Interlaken");

        let coordinate = Coordinate::new(46.6863, 7.8632).unwrap();
        let place = Place::resolved(
            "Interlaken",
            Fix::named(coordinate, "Interlaken, Bern, Schweiz"),
            LocationSource::TextGeocode,
        );
        assert_eq!(place.require_coordinate().unwrap(), coordinate);
        assert_eq!(place.label(), "Interlaken, Bern, Schweiz");
    }
}
