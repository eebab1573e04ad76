//! Device classification types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse form factor of the visitor's device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

/// Browser family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Opera,
    Unknown,
}

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingSystem {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Unknown,
}

/// Everything derived from a user-agent string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub browser: Browser,
    pub operating_system: OperatingSystem,
    /// The raw header the classification was made from.
    pub user_agent: String,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceType::Desktop => "Desktop",
            DeviceType::Mobile => "Mobile",
            DeviceType::Tablet => "Tablet",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
            Browser::Safari => "Safari",
            Browser::Edge => "Edge",
            Browser::Opera => "Opera",
            Browser::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperatingSystem::Windows => "Windows",
            OperatingSystem::MacOs => "macOS",
            OperatingSystem::Linux => "Linux",
            OperatingSystem::Android => "Android",
            OperatingSystem::Ios => "iOS",
            OperatingSystem::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}
