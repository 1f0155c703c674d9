//! Navigation handoff to an external map application
//!
//! No routing happens here: the chosen endpoints are encoded into a map
//! service URL which is handed to the operating system's default handler.

use tracing::{info, instrument};

use crate::Result;
use crate::models::{Coordinate, VariantKind};

/// Google Maps directions endpoint (Maps URLs, `api=1`)
pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Directions URL for driving from `origin` to `destination`
#[must_use]
pub fn build_navigation_request(origin: Coordinate, destination: Coordinate) -> String {
    NavigationHandoff::new(DEFAULT_MAPS_BASE_URL, false).request_url(origin, destination, None)
}

/// Hand `url` to the default browser without waiting for it
#[instrument]
pub fn open_in_browser(url: &str) -> Result<()> {
    open::that_detached(url)?;
    info!("Opened navigation in the default browser");
    Ok(())
}

/// Builds map URLs and optionally opens them
#[derive(Debug, Clone)]
pub struct NavigationHandoff {
    base_url: String,
    open_browser: bool,
}

impl NavigationHandoff {
    #[must_use]
    pub fn new(base_url: impl Into<String>, open_browser: bool) -> Self {
        Self {
            base_url: base_url.into(),
            open_browser,
        }
    }

    /// Directions URL; a cheapest-route request also asks to avoid tolls
    #[must_use]
    pub fn request_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        variant: Option<VariantKind>,
    ) -> String {
        let mut url = format!(
            "{}?api=1&origin={}&destination={}&travelmode=driving",
            self.base_url,
            urlencoding::encode(&origin.to_query_pair()),
            urlencoding::encode(&destination.to_query_pair())
        );
        if variant == Some(VariantKind::Cheapest) {
            url.push_str("&avoid=tolls");
        }
        url
    }

    /// Open the URL unless opening is disabled; returns whether it was opened
    pub fn hand_off(&self, url: &str) -> Result<bool> {
        if !self.open_browser {
            return Ok(false);
        }
        open_in_browser(url)?;
        Ok(true)
    }
}
