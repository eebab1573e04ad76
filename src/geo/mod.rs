//! IP geolocation subsystem.
//!
//! # Data Flow
//! ```text
//! client IP
//!     → resolver.rs (needs_discovery? → public-IP provider → fallback address)
//!     → geolocation provider (GET {api_url}/{ip}/?token=...)
//!     → types.rs (FindIpRecord → LocationInfo, "Unknown" defaults)
//!
//! Any failure → LocationInfo::unavailable (success = false, error = message)
//! ```

pub mod error;
pub mod resolver;
pub mod types;

pub use error::{GeoError, GeoResult};
pub use resolver::{needs_discovery, GeoResolver};
pub use types::{FindIpRecord, LocationInfo, UNKNOWN};
