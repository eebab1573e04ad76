//! Client profile types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::device::DeviceInfo;
use crate::geo::LocationInfo;

/// Validated personal details from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    pub name: String,
    pub age: u64,
}

/// Addresses observed for the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// Normalized client address from headers or the socket.
    pub ip_address: String,
    /// Address the geolocation provider actually resolved.
    pub public_ip: String,
}

/// Whether enrichment succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub service: String,
    pub status: LookupStatus,
}

/// Everything returned to the client for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub personal: Visitor,
    pub network: NetworkInfo,
    pub location: LocationInfo,
    pub device: DeviceInfo,
    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,
    pub api: ApiInfo,
}

impl ClientProfile {
    /// Merge the per-request pieces into one profile.
    pub fn assemble(
        visitor: Visitor,
        client_ip: String,
        device: DeviceInfo,
        location: LocationInfo,
        service: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let status = if location.success {
            LookupStatus::Success
        } else {
            LookupStatus::Failed
        };

        Self {
            personal: visitor,
            network: NetworkInfo {
                ip_address: client_ip,
                public_ip: location.ip.clone(),
            },
            location,
            device,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            api: ApiInfo {
                service: service.to_string(),
                status,
            },
        }
    }
}
