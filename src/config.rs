//! Configuration management for route planning
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RouteError;
use crate::models::VariantKind;
use crate::navigation::DEFAULT_MAPS_BASE_URL;
use crate::scoring::{DEFAULT_BASE_SPEED_KMH, ScoringProfile};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePlannerConfig {
    /// Location sources
    pub geolocation: GeolocationConfig,
    /// Fuel price, speed and traffic coefficients
    pub estimation: ScoringProfile,
    pub toll: TollConfig,
    pub navigation: NavigationConfig,
    pub logging: LoggingConfig,
}

/// Geocoding, IP location and GPS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Upper bound for each external call, in seconds
    pub timeout_seconds: u32,
    /// Identifies this client to the geocoding service
    pub user_agent: String,
    /// Nominatim-compatible search service
    pub geocoding_url: String,
    pub ip_location_url: String,
    pub gps_enabled: bool,
    /// gpsd daemon, `host:port`
    pub gpsd_address: String,
    /// Place geocoded when neither GPS nor IP location work
    pub fallback_place: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TollConfig {
    /// Replacement for the bundled toll table
    pub table_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub base_url: String,
    /// Open the chosen route in the default browser
    pub open_browser: bool,
    /// Variant handed to the map application
    pub handoff_variant: VariantKind,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_timeout() -> u32 {
    8
}

fn default_user_agent() -> String {
    format!("routeplanner/{}", crate::VERSION)
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_ip_location_url() -> String {
    "https://ipapi.co/json/".to_string()
}

fn default_gpsd_address() -> String {
    "127.0.0.1:2947".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            geocoding_url: default_geocoding_url(),
            ip_location_url: default_ip_location_url(),
            gps_enabled: true,
            gpsd_address: default_gpsd_address(),
            fallback_place: None,
        }
    }
}

impl GeolocationConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MAPS_BASE_URL.to_string(),
            open_browser: true,
            handoff_variant: VariantKind::Cheapest,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RoutePlannerConfig {
    /// Load configuration from a file and environment variables
    ///
    /// Without a path the default location from [`Self::get_config_path`]
    /// is used; a missing file leaves every setting at its default.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.or_else(Self::get_config_path);

        if let Some(config_file) = config_file.filter(|path| path.exists()) {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ROUTEPLANNER_ESTIMATION__FUEL_PRICE_PER_LITER=1.9
        builder = builder.add_source(
            Environment::with_prefix("ROUTEPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RoutePlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("routeplanner").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        let geolocation = &mut self.geolocation;
        if geolocation.timeout_seconds == 0 {
            geolocation.timeout_seconds = default_timeout();
        }
        if geolocation.user_agent.is_empty() {
            geolocation.user_agent = default_user_agent();
        }
        if geolocation.geocoding_url.is_empty() {
            geolocation.geocoding_url = default_geocoding_url();
        }
        if geolocation.ip_location_url.is_empty() {
            geolocation.ip_location_url = default_ip_location_url();
        }
        if geolocation.gpsd_address.is_empty() {
            geolocation.gpsd_address = default_gpsd_address();
        }
        if geolocation
            .fallback_place
            .as_ref()
            .is_some_and(|place| place.trim().is_empty())
        {
            geolocation.fallback_place = None;
        }
        if self.estimation.base_speed_kmh == 0.0 {
            self.estimation.base_speed_kmh = DEFAULT_BASE_SPEED_KMH;
        }
        if self.navigation.base_url.is_empty() {
            self.navigation.base_url = DEFAULT_MAPS_BASE_URL.to_string();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geolocation.timeout_seconds > 60 {
            return Err(RouteError::validation("Geolocation timeout cannot exceed 60 seconds").into());
        }

        self.estimation
            .validate()
            .with_context(|| "Invalid estimation settings")?;

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RouteError::validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RouteError::validation(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Geocoding URL", &self.geolocation.geocoding_url),
            ("IP location URL", &self.geolocation.ip_location_url),
            ("Navigation base URL", &self.navigation.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RouteError::validation(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if !self.geolocation.gpsd_address.contains(':') {
            return Err(RouteError::validation("gpsd address must be host:port").into());
        }

        Ok(())
    }
}
