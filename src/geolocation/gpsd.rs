use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, instrument, trace};

use super::LocationStrategy;
use crate::models::{Coordinate, Fix, LocationSource};
use crate::{Result, RouteError};

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true}\n";

/// Reports without a usable fix before giving up
const MAX_REPORTS: usize = 64;

/// GPS position from a local gpsd daemon
pub struct GpsdLocator {
    address: String,
    enabled: bool,
}

/// Subset of a gpsd report; only TPV reports carry a position
#[derive(Debug, Deserialize)]
struct Report {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl Report {
    /// Position of a TPV report with at least a 2D fix
    fn position(&self) -> Option<(f64, f64)> {
        if self.class != "TPV" || self.mode < 2 {
            return None;
        }
        Some((self.lat?, self.lon?))
    }
}

impl GpsdLocator {
    #[must_use]
    pub fn new(address: impl Into<String>, enabled: bool) -> Self {
        Self {
            address: address.into(),
            enabled,
        }
    }
}

#[async_trait]
impl LocationStrategy for GpsdLocator {
    fn source(&self) -> LocationSource {
        LocationSource::Gps
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    #[instrument(skip(self), fields(address = %self.address))]
    async fn locate(&self) -> Result<Fix> {
        let mut stream = TcpStream::connect(&self.address).await.map_err(|e| {
            RouteError::location_unavailable(format!("gpsd not reachable at {}: {e}", self.address))
        })?;
        stream.write_all(WATCH_COMMAND).await?;

        let mut lines = BufReader::new(stream).lines();
        let mut reports = 0;
        while let Some(line) = lines.next_line().await? {
            let Ok(report) = serde_json::from_str::<Report>(&line) else {
                trace!("Ignoring unparseable gpsd line");
                continue;
            };
            if let Some((lat, lon)) = report.position() {
                let coordinate = Coordinate::new(lat, lon)
                    .map_err(|e| RouteError::location_unavailable(e.to_string()))?;
                debug!("gpsd fix: {}", coordinate);
                return Ok(Fix::new(coordinate));
            }

            reports += 1;
            if reports >= MAX_REPORTS {
                break;
            }
        }

        Err(RouteError::location_unavailable("gpsd has no position fix"))
    }
}
