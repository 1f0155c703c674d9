//! Data models for route planning
//!
//! This module contains the core value types organized by concern:
//! - Location: validated coordinates and resolved places
//! - Route: per-variant estimates and the three-variant result set

pub mod location;
pub mod route;

// Re-export all public types for convenient access
pub use location::{Coordinate, Fix, LocationSource, Place};
pub use route::{RouteEstimate, RouteOptions, VariantKind};
