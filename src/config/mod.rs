//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks, startup warnings)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to the handler state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, load_with, ConfigError};
pub use schema::{
    AppConfig, GeolocationConfig, ListenerConfig, ObservabilityConfig, PublicIpConfig,
    SecurityConfig, TimeoutConfig,
};
pub use validation::{config_warnings, validate_config, ValidationError, ValidationWarning};
