//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the visitor profile service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Geolocation provider settings.
    pub geolocation: GeolocationConfig,

    /// Public-IP discovery settings.
    pub public_ip: PublicIpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Geolocation provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Base URL of the provider; the target IP is appended as a path segment.
    pub api_url: String,

    /// API token sent as the `token` query parameter.
    ///
    /// Empty by default. There is deliberately no built-in token: supply one
    /// through the config file or `FINDIP_API_KEY`.
    pub api_key: String,

    /// Label reported back to clients in `api.service`.
    pub service_name: String,

    /// Upper bound on a single lookup, in seconds.
    pub timeout_secs: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.findip.net".to_string(),
            api_key: String::new(),
            service_name: "findip.net".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Public-IP discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublicIpConfig {
    /// Endpoint answering with `{"ip": "..."}`.
    pub url: String,

    /// Address used when discovery fails. `None` makes the lookup degrade instead.
    pub fallback_address: Option<String>,

    /// Upper bound on a single discovery call, in seconds.
    pub timeout_secs: u64,
}

impl Default for PublicIpConfig {
    fn default() -> Self {
        Self {
            url: "https://api.ipify.org?format=json".to_string(),
            // OpenDNS resolver, kept as the historical last-resort target.
            fallback_address: Some("208.67.222.222".to_string()),
            timeout_secs: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Allow cross-origin form posts from any origin.
    pub cors_permissive: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KiB
            cors_permissive: true,
        }
    }
}
