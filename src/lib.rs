//! Visitor profile service library.
//!
//! Turns a name/age form submission into a profile enriched with the
//! visitor's network address, device classification and IP geolocation.

pub mod config;
pub mod device;
pub mod geo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod profile;

pub use config::AppConfig;
pub use geo::{GeoResolver, LocationInfo};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use profile::ClientProfile;
