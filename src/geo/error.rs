//! Geolocation error definitions.

use thiserror::Error;

/// Errors that can occur during a geolocation lookup.
///
/// None of these reach HTTP clients as failures; the resolver turns them into
/// a degraded [`LocationInfo`](crate::geo::LocationInfo).
#[derive(Debug, Error)]
pub enum GeoError {
    /// No API token configured.
    #[error("geolocation API token is not configured")]
    MissingApiKey,

    /// The provider URL could not be built.
    #[error("invalid geolocation URL: {0}")]
    InvalidUrl(String),

    /// Connection, timeout or body read failure.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("API responded with status: {0}")]
    UpstreamStatus(u16),

    /// Body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result type for geolocation operations.
pub type GeoResult<T> = Result<T, GeoError>;

// Request URLs carry the API token, so they are stripped before the error
// can end up in a response body or a log line.
impl From<reqwest::Error> for GeoError {
    fn from(e: reqwest::Error) -> Self {
        GeoError::Request(e.without_url())
    }
}

impl GeoError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GeoError::MissingApiKey => "missing_api_key",
            GeoError::InvalidUrl(_) => "invalid_url",
            GeoError::Request(e) if e.is_timeout() => "timeout",
            GeoError::Request(_) => "request",
            GeoError::UpstreamStatus(_) => "upstream_status",
            GeoError::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeoError::UpstreamStatus(503);
        assert_eq!(err.to_string(), "API responded with status: 503");
        assert_eq!(err.kind(), "upstream_status");

        let err = GeoError::MissingApiKey;
        assert!(err.to_string().contains("token"));
    }
}
