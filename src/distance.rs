//! Great-circle distance between coordinates

use crate::models::Coordinate;

/// Mean Earth radius used by the haversine formula, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.latitude(),
            longitude: a.longitude(),
        },
        haversine::Location {
            latitude: b.latitude(),
            longitude: b.longitude(),
        },
        haversine::Units::Kilometers,
    )
}
