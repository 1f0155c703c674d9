//! Error types and handling for route planning

use std::fmt;

use thiserror::Error;

/// Which end of a route query an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Origin,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Origin => write!(f, "origin"),
            Endpoint::Destination => write!(f, "destination"),
        }
    }
}

/// Main error type for route planning
#[derive(Error, Debug)]
pub enum RouteError {
    /// No location source produced a position
    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    /// A place name could not be turned into coordinates
    #[error("Geocoding failed for '{query}': {message}")]
    Geocode { query: String, message: String },

    /// Transport-level failure talking to an external service
    #[error("Network error: {message}")]
    Network { message: String },

    /// A required setting has no usable value
    #[error("Configuration missing: {message}")]
    ConfigurationMissing { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Resolution of one endpoint of the route failed
    #[error("Could not resolve {endpoint}: {source}")]
    Endpoint {
        endpoint: Endpoint,
        #[source]
        source: Box<RouteError>,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl RouteError {
    pub fn location_unavailable<S: Into<String>>(message: S) -> Self {
        Self::LocationUnavailable {
            message: message.into(),
        }
    }

    pub fn geocode<Q: Into<String>, S: Into<String>>(query: Q, message: S) -> Self {
        Self::Geocode {
            query: query.into(),
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn configuration_missing<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Attach the endpoint that failed to resolve
    #[must_use]
    pub fn for_endpoint(self, endpoint: Endpoint) -> Self {
        match self {
            // already tagged, keep the innermost endpoint
            err @ RouteError::Endpoint { .. } => err,
            err => RouteError::Endpoint {
                endpoint,
                source: Box::new(err),
            },
        }
    }

    /// The endpoint this error is attributed to, if any
    #[must_use]
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            RouteError::Endpoint { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }

    /// Get a user-friendly message, suitable for speaking back
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RouteError::LocationUnavailable { .. } => {
                "I could not detect your current location.".to_string()
            }
            RouteError::Geocode { query, .. } => {
                format!("I could not find a place called {query}.")
            }
            RouteError::Network { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            RouteError::ConfigurationMissing { message } => {
                format!("Configuration error: {message}.")
            }
            RouteError::Validation { message } => format!("Invalid input: {message}"),
            RouteError::Endpoint { endpoint, source } => {
                format!("I could not work out the {endpoint}. {}", source.user_message())
            }
            RouteError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RouteError::network(format!("request timed out: {err}"))
        } else {
            RouteError::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RouteError::location_unavailable("no gps");
        assert!(matches!(err, RouteError::LocationUnavailable { .. }));

        let err = RouteError::geocode("Nowhere", "no match");
        assert!(matches!(err, RouteError::Geocode { .. }));

        let err = RouteError::validation("negative distance");
        assert!(matches!(err, RouteError::Validation { .. }));
    }

    #[test]
    fn test_endpoint_tagging() {
        let err = RouteError::geocode("Nowhere12345xyz", "no match").for_endpoint(Endpoint::Destination);
        assert_eq!(err.endpoint(), Some(Endpoint::Destination));
        assert!(err.to_string().starts_with("Could not resolve destination"));

        // a second tag does not overwrite the first
        let err = err.for_endpoint(Endpoint::Origin);
        assert_eq!(err.endpoint(), Some(Endpoint::Destination));
    }

    #[test]
    fn test_user_messages() {
        let err = RouteError::geocode("Atlantis", "no match").for_endpoint(Endpoint::Origin);
        let message = err.user_message();
        assert!(message.contains("origin"));
        assert!(message.contains("Atlantis"));

        let err = RouteError::network("connection refused");
        assert!(err.user_message().contains("Unable to connect"));

        let err = RouteError::validation("test input");
        assert!(err.user_message().contains("test input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RouteError = io_err.into();
        assert!(matches!(err, RouteError::Io { .. }));
    }
}
