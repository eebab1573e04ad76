//! Geolocation types.
//!
//! [`FindIpRecord`] mirrors the provider's JSON with every node optional. All
//! defaulting into [`LocationInfo`] happens in one place,
//! [`FindIpRecord::into_location`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for any field the provider did not supply.
pub const UNKNOWN: &str = "Unknown";

/// Location details for a single address, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub continent: String,
    pub country: String,
    pub country_code: String,
    pub currency: String,
    pub timezone: String,
    /// Address the provider reported (or the one that was asked about).
    pub ip: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocationInfo {
    /// Degraded record for a lookup that failed.
    ///
    /// `ip` echoes the address the caller originally asked about.
    pub fn unavailable(ip: &str, error: impl ToString) -> Self {
        Self {
            city: UNKNOWN.to_string(),
            continent: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            country_code: UNKNOWN.to_string(),
            currency: UNKNOWN.to_string(),
            timezone: UNKNOWN.to_string(),
            ip: ip.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Raw findip.net response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindIpRecord {
    pub city: Option<NamedNode>,
    pub continent: Option<NamedNode>,
    pub country: Option<CountryNode>,
    /// Only a plain string counts; any other shape is treated as absent.
    pub currency: Option<Value>,
    pub location: Option<LocationNode>,
    pub traits: Option<TraitsNode>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Names {
    pub en: Option<String>,
}

/// Any node carrying localized names (city, continent).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedNode {
    pub names: Option<Names>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryNode {
    pub names: Option<Names>,
    pub iso_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationNode {
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraitsNode {
    pub ip_address: Option<String>,
}

impl NamedNode {
    fn english(&self) -> Option<&str> {
        english(self.names.as_ref())
    }
}

fn english(names: Option<&Names>) -> Option<&str> {
    names.and_then(|n| n.en.as_deref())
}

/// Treat empty strings the same as absent ones.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn or_unknown(value: Option<&str>) -> String {
    present(value).unwrap_or(UNKNOWN).to_string()
}

impl FindIpRecord {
    /// Convert into a successful [`LocationInfo`].
    ///
    /// Field defaults:
    /// - city / continent / country: `names.en`, else "Unknown"
    /// - country_code: `country.iso_code`, else "Unknown"
    /// - timezone: `location.time_zone`, else "Unknown"
    /// - currency: `currency`, else "USD" for country code "US", else "Unknown"
    /// - ip: `traits.ip_address`, else `ip`, else `target_ip`
    pub fn into_location(self, target_ip: &str) -> LocationInfo {
        let country_code = self.country.as_ref().and_then(|c| c.iso_code.as_deref());

        let currency = match present(self.currency.as_ref().and_then(Value::as_str)) {
            Some(currency) => currency.to_string(),
            None if country_code == Some("US") => "USD".to_string(),
            None => UNKNOWN.to_string(),
        };

        let ip = present(self.traits.as_ref().and_then(|t| t.ip_address.as_deref()))
            .or_else(|| present(self.ip.as_deref()))
            .unwrap_or(target_ip)
            .to_string();

        LocationInfo {
            city: or_unknown(self.city.as_ref().and_then(NamedNode::english)),
            continent: or_unknown(self.continent.as_ref().and_then(NamedNode::english)),
            country: or_unknown(self.country.as_ref().and_then(|c| english(c.names.as_ref()))),
            country_code: or_unknown(country_code),
            currency,
            timezone: or_unknown(self.location.as_ref().and_then(|l| l.time_zone.as_deref())),
            ip,
            success: true,
            error: None,
        }
    }
}

/// Response of the public-IP discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicIpResponse {
    pub ip: String,
}
