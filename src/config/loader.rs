//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable carrying the listener port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable carrying the geolocation API token.
pub const ENV_API_KEY: &str = "FINDIP_API_KEY";
/// Older spelling of [`ENV_API_KEY`], still honoured.
pub const ENV_API_KEY_LEGACY: &str = "API_Key";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for environment variable {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and deserialize a TOML config file. Validation happens in [`load`],
/// after environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the startup configuration: optional file, then environment overrides,
/// then validation.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with(path, |var| std::env::var(var).ok())
}

/// [`load`] with the environment supplied by `lookup`.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-supplied values onto `config`.
///
/// `lookup` abstracts the environment so callers (and tests) can supply their own.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_PORT).filter(|p| !p.trim().is_empty()) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_PORT,
            value: port.clone(),
        })?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }

    let api_key = lookup(ENV_API_KEY)
        .or_else(|| lookup(ENV_API_KEY_LEGACY))
        .filter(|k| !k.trim().is_empty());
    if let Some(key) = api_key {
        config.geolocation.api_key = key.trim().to_string();
    }

    Ok(())
}

fn with_port(bind_address: &str, port: u16) -> String {
    match bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    }
}
