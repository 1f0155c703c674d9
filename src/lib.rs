//! `RoutePlanner` - route option estimates for a voice assistant
//!
//! This library resolves where a trip starts and ends, and estimates a
//! fastest, a cheapest and a balanced driving option between the two. The
//! chosen option can be handed to an external map application.

pub mod command;
pub mod config;
pub mod distance;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod navigation;
pub mod output;
pub mod planner;
pub mod scoring;
pub mod toll;

// Re-export core types for public API
pub use command::{RouteRequest, extract_destination, is_current_location, parse_route_request};
pub use config::RoutePlannerConfig;
pub use distance::distance;
pub use error::{Endpoint, RouteError};
pub use geolocation::Geolocator;
pub use models::{Coordinate, LocationSource, Place, RouteEstimate, RouteOptions, VariantKind};
pub use navigation::{NavigationHandoff, build_navigation_request, open_in_browser};
pub use planner::{RoutePlan, RoutePlanner};
pub use scoring::{ScoringProfile, score_routes};
pub use toll::TollTable;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RouteError>;
