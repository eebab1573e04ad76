//! Device classification from the `User-Agent` header.

pub mod classifier;
pub mod types;

pub use classifier::classify;
pub use types::{Browser, DeviceInfo, DeviceType, OperatingSystem};
