//! Location resolver.
//!
//! # Responsibilities
//! - Replace non-routable client addresses with the server's public IP
//! - Query the geolocation provider with a bounded timeout
//! - Absorb every failure into a degraded [`LocationInfo`]
//!
//! The two upstream calls run sequentially: the lookup target depends on the
//! discovery result.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use url::Url;

use crate::config::{AppConfig, GeolocationConfig, PublicIpConfig};
use crate::geo::error::{GeoError, GeoResult};
use crate::geo::types::{FindIpRecord, LocationInfo, PublicIpResponse};
use crate::observability::metrics;

/// Resolves client addresses to locations via the configured providers.
#[derive(Clone)]
pub struct GeoResolver {
    client: reqwest::Client,
    geolocation: GeolocationConfig,
    public_ip: PublicIpConfig,
}

impl GeoResolver {
    /// Create a resolver with its own connection pool.
    pub fn new(geolocation: GeolocationConfig, public_ip: PublicIpConfig) -> GeoResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("visitor-profile/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, geolocation, public_ip))
    }

    /// Create a resolver sharing an existing client.
    pub fn with_client(
        client: reqwest::Client,
        geolocation: GeolocationConfig,
        public_ip: PublicIpConfig,
    ) -> Self {
        Self {
            client,
            geolocation,
            public_ip,
        }
    }

    pub fn from_config(config: &AppConfig) -> GeoResult<Self> {
        Self::new(config.geolocation.clone(), config.public_ip.clone())
    }

    /// Label of the geolocation provider, echoed in client responses.
    pub fn service_name(&self) -> &str {
        &self.geolocation.service_name
    }

    /// Resolve `ip` to a location. Never fails.
    ///
    /// On any error the result has `success == false`, every text field set to
    /// "Unknown", `ip` echoing the input and `error` carrying the message.
    pub async fn resolve(&self, ip: &str) -> LocationInfo {
        match self.lookup(ip).await {
            Ok(location) => {
                metrics::record_lookup("success");
                tracing::debug!(
                    ip = %ip,
                    resolved_ip = %location.ip,
                    country = %location.country,
                    "Geolocation lookup succeeded"
                );
                location
            }
            Err(e) => {
                metrics::record_lookup(e.kind());
                tracing::warn!(ip = %ip, error = %e, "Geolocation lookup failed");
                LocationInfo::unavailable(ip, e)
            }
        }
    }

    async fn lookup(&self, ip: &str) -> GeoResult<LocationInfo> {
        if self.geolocation.api_key.trim().is_empty() {
            return Err(GeoError::MissingApiKey);
        }

        let target = if needs_discovery(ip) {
            self.discover_public_ip().await?
        } else {
            ip.trim().to_string()
        };

        let url = self.lookup_url(&target)?;
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.geolocation.timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UpstreamStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let record: FindIpRecord =
            serde_json::from_str(&body).map_err(|e| GeoError::Decode(e.to_string()))?;

        Ok(record.into_location(&target))
    }

    /// Discover the address this server is seen from.
    ///
    /// Falls back to `public_ip.fallback_address` when discovery fails; with no
    /// fallback configured the discovery error is returned.
    pub async fn discover_public_ip(&self) -> GeoResult<String> {
        match self.fetch_public_ip().await {
            Ok(ip) => {
                metrics::record_discovery("success");
                tracing::debug!(public_ip = %ip, "Public IP discovered");
                Ok(ip)
            }
            Err(e) => match &self.public_ip.fallback_address {
                Some(fallback) => {
                    metrics::record_discovery("fallback");
                    tracing::warn!(
                        error = %e,
                        fallback = %fallback,
                        "Public IP discovery failed, using fallback address"
                    );
                    Ok(fallback.clone())
                }
                None => {
                    metrics::record_discovery("failed");
                    tracing::warn!(error = %e, "Public IP discovery failed");
                    Err(e)
                }
            },
        }
    }

    async fn fetch_public_ip(&self) -> GeoResult<String> {
        let response = self
            .client
            .get(&self.public_ip.url)
            .timeout(Duration::from_secs(self.public_ip.timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UpstreamStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: PublicIpResponse =
            serde_json::from_str(&body).map_err(|e| GeoError::Decode(e.to_string()))?;

        let ip = parsed.ip.trim();
        if ip.is_empty() {
            return Err(GeoError::Decode("empty ip field".to_string()));
        }
        Ok(ip.to_string())
    }

    /// `{api_url}/{target}/?token={api_key}`, with `target` escaped as a single
    /// path segment.
    fn lookup_url(&self, target: &str) -> GeoResult<Url> {
        let mut url = Url::parse(&self.geolocation.api_url)
            .map_err(|e| GeoError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| GeoError::InvalidUrl("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(target)
            .push("");

        url.query_pairs_mut()
            .append_pair("token", &self.geolocation.api_key);

        Ok(url)
    }
}

/// Whether `ip` cannot be geolocated as-is and the public IP should be used.
///
/// True for empty input and for loopback, private, link-local and unspecified
/// addresses (IPv4-mapped forms included). Unparseable input is passed through
/// so the provider can reject it.
pub fn needs_discovery(ip: &str) -> bool {
    let ip = ip.trim();
    if ip.is_empty() {
        return true;
    }
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_local_v4(v4),
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => is_local_v4(v4),
            None => is_local_v6(v6),
        },
        Err(_) => false,
    }
}

fn is_local_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
}

fn is_local_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}
