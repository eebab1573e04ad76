//! Client profile assembly.

pub mod types;

pub use types::{ApiInfo, ClientProfile, LookupStatus, NetworkInfo, Visitor};
