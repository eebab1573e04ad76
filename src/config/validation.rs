//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. All problems are
//! reported together rather than stopping at the first one.

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A semantic problem that prevents the service from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("{field} '{value}' is not a valid http(s) URL")]
    Url { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("public_ip.fallback_address '{0}' is not an IP address")]
    FallbackAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// A configuration that starts but runs in a degraded or unsafe mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    #[error("no geolocation API token configured; every lookup will report failure")]
    MissingApiKey,

    #[error("geolocation API URL uses plain http; the API token is sent in clear text")]
    InsecureApiUrl,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    check_url(&mut errors, "geolocation.api_url", &config.geolocation.api_url);
    check_url(&mut errors, "public_ip.url", &config.public_ip.url);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.geolocation.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("geolocation.timeout_secs"));
    }
    if config.public_ip.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("public_ip.timeout_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if let Some(fallback) = &config.public_ip.fallback_address {
        if fallback.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::FallbackAddress(fallback.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal findings worth logging at startup.
pub fn config_warnings(config: &AppConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    if config.geolocation.api_key.trim().is_empty() {
        warnings.push(ValidationWarning::MissingApiKey);
    }
    if config.geolocation.api_url.starts_with("http://") {
        warnings.push(ValidationWarning::InsecureApiUrl);
    }
    warnings
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::Url {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.geolocation.api_url = "ftp://example.com".into();
        config.geolocation.timeout_secs = 0;
        config.public_ip.fallback_address = Some("nope".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroValue("geolocation.timeout_secs")));
    }

    #[test]
    fn test_missing_api_key_is_a_warning() {
        let config = AppConfig::default();
        assert_eq!(config_warnings(&config), vec![ValidationWarning::MissingApiKey]);

        let mut config = AppConfig::default();
        config.geolocation.api_key = "secret".into();
        assert!(config_warnings(&config).is_empty());
    }

    #[test]
    fn test_plain_http_api_url_warns() {
        let mut config = AppConfig::default();
        config.geolocation.api_key = "secret".into();
        config.geolocation.api_url = "http://127.0.0.1:9000".into();
        assert_eq!(config_warnings(&config), vec![ValidationWarning::InsecureApiUrl]);
    }
}
